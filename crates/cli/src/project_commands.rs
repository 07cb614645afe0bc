use {
    anyhow::{Result, bail},
    clap::Subcommand,
    relay_projects::{Project, ProjectStore},
};

#[derive(Subcommand)]
pub enum ProjectAction {
    /// List every project, sorted by slug.
    List,
    /// Show one project.
    Show { slug: String },
    /// Create a project bound to an executor chat.
    Create {
        slug: String,
        #[arg(allow_negative_numbers = true)]
        executor_chat_id: i64,
    },
    /// Bind (or rebind) the customer chat and reactivate the project.
    Bind {
        slug: String,
        #[arg(allow_negative_numbers = true)]
        customer_chat_id: i64,
    },
    /// Detach a chat from a project; deactivates if the chat is not bound.
    Unlink {
        slug: String,
        #[arg(allow_negative_numbers = true)]
        chat_id: i64,
    },
}

pub async fn handle_projects(action: ProjectAction, store: &dyn ProjectStore) -> Result<()> {
    match action {
        ProjectAction::List => {
            let projects = store.list_projects().await?;
            if projects.is_empty() {
                println!("No projects.");
            }
            for project in &projects {
                println!("{}", project_row(project));
            }
        },
        ProjectAction::Show { slug } => match store.get(&slug).await? {
            Some(project) => print!("{}", project_details(&project)),
            None => bail!("project `{slug}` not found"),
        },
        ProjectAction::Create {
            slug,
            executor_chat_id,
        } => {
            let project = store.create_project(&slug, executor_chat_id).await?;
            print!("{}", project_details(&project));
        },
        ProjectAction::Bind {
            slug,
            customer_chat_id,
        } => {
            let project = store.bind_customer(&slug, customer_chat_id).await?;
            print!("{}", project_details(&project));
        },
        ProjectAction::Unlink { slug, chat_id } => {
            let project = store.unlink_chat(&slug, chat_id).await?;
            print!("{}", project_details(&project));
        },
    }
    Ok(())
}

fn endpoint(chat_id: Option<i64>) -> String {
    chat_id.map_or_else(|| "-".to_string(), |id| id.to_string())
}

fn status(project: &Project) -> &'static str {
    if project.is_active {
        "active"
    } else {
        "inactive"
    }
}

fn project_row(project: &Project) -> String {
    format!(
        "{:<20} {:<8} customer={:<16} executor={}",
        project.slug,
        status(project),
        endpoint(project.customer_chat_id),
        endpoint(project.executor_chat_id),
    )
}

fn project_details(project: &Project) -> String {
    format!(
        "slug:     {}\nstatus:   {}\ncustomer: {}\nexecutor: {}\n",
        project.slug,
        status(project),
        endpoint(project.customer_chat_id),
        endpoint(project.executor_chat_id),
    )
}
