//! Slash commands: parsing and execution against the project store.

use std::sync::Arc;

use {
    relay_common::{ChatId, UserId},
    relay_projects::{Error as StoreError, ProjectStore},
    teloxide::types::BotCommand,
    tracing::{error, info},
};

use crate::{access::AdminGate, strings};

/// A recognised slash command. Slug-taking commands carry `None` when the
/// argument is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    ProjectInfo,
    CreateProject(Option<String>),
    BindCustomer(Option<String>),
    UnlinkProject(Option<String>),
    ListProjects,
    /// Unrecognised, or addressed to a different bot.
    Other(String),
}

/// Longest command name Telegram accepts.
const MAX_COMMAND_LEN: usize = 32;

impl Command {
    /// Parse `text` as a command. Returns `None` when it is not one.
    ///
    /// Only heads matching Telegram's command grammar (`/[A-Za-z0-9_]{1,32}`,
    /// optionally `@botname`) count, so prose like `/ path` or `//note` stays
    /// a plain message. Names are case-insensitive. `/cmd@name` is accepted
    /// only when `name` matches `bot_username`.
    pub fn parse(text: &str, bot_username: Option<&str>) -> Option<Self> {
        let body = text.strip_prefix('/')?;
        let mut parts = body.split_whitespace();
        let head = parts.next().filter(|h| body.starts_with(*h))?;
        let arg = parts.next().map(str::to_string);

        let (name, addressee) = match head.split_once('@') {
            Some((name, to)) => (name, Some(to)),
            None => (head, None),
        };
        if !is_command_name(name) || addressee.is_some_and(str::is_empty) {
            return None;
        }
        if let Some(to) = addressee
            && !bot_username.is_some_and(|me| me.eq_ignore_ascii_case(to))
        {
            return Some(Self::Other(head.to_string()));
        }

        let name = name.to_ascii_lowercase();
        Some(match name.as_str() {
            "start" => Self::Start,
            "project_info" => Self::ProjectInfo,
            "create_project" => Self::CreateProject(arg),
            "bind_customer" => Self::BindCustomer(arg),
            "unlink_project" => Self::UnlinkProject(arg),
            "list_projects" => Self::ListProjects,
            other => Self::Other(other.to_string()),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Start => "start",
            Self::ProjectInfo => "project_info",
            Self::CreateProject(_) => "create_project",
            Self::BindCustomer(_) => "bind_customer",
            Self::UnlinkProject(_) => "unlink_project",
            Self::ListProjects => "list_projects",
            Self::Other(name) => name,
        }
    }

    #[must_use]
    pub fn is_privileged(&self) -> bool {
        matches!(
            self,
            Self::CreateProject(_)
                | Self::BindCustomer(_)
                | Self::UnlinkProject(_)
                | Self::ListProjects
        )
    }
}

fn is_command_name(name: &str) -> bool {
    (1..=MAX_COMMAND_LEN).contains(&name.len())
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Commands registered with Telegram for client autocomplete.
pub fn bot_commands() -> Vec<BotCommand> {
    vec![
        BotCommand::new("project_info", "Привязка этого чата"),
        BotCommand::new("create_project", "Создать проект (админ)"),
        BotCommand::new("bind_customer", "Привязать чат заказчика (админ)"),
        BotCommand::new("unlink_project", "Отвязать чат (админ)"),
        BotCommand::new("list_projects", "Список проектов (админ)"),
    ]
}

#[derive(Debug, Clone, Copy)]
enum SlugOp {
    Create,
    Bind,
    Unlink,
}

impl SlugOp {
    fn name(self) -> &'static str {
        match self {
            Self::Create => "create_project",
            Self::Bind => "bind_customer",
            Self::Unlink => "unlink_project",
        }
    }
}

/// Executes commands on behalf of a chat.
pub struct Commands {
    store: Arc<dyn ProjectStore>,
    gate: AdminGate,
}

impl Commands {
    pub fn new(store: Arc<dyn ProjectStore>, gate: AdminGate) -> Self {
        Self { store, gate }
    }

    /// Run `cmd` issued in `chat_id` by `user_id` and return the reply, or
    /// `None` for commands this bot does not answer.
    pub async fn execute(
        &self,
        cmd: &Command,
        chat_id: ChatId,
        user_id: Option<UserId>,
    ) -> Option<String> {
        let reply = match cmd {
            Command::Other(_) => return None,
            Command::Start => strings::START.to_string(),
            Command::ProjectInfo => self.project_info(chat_id).await,
            Command::ListProjects => {
                self.gate
                    .guard(user_id, cmd.name(), || self.list_projects())
                    .await
            },
            Command::CreateProject(slug) => {
                self.guarded(SlugOp::Create, slug.as_deref(), chat_id, user_id)
                    .await
            },
            Command::BindCustomer(slug) => {
                self.guarded(SlugOp::Bind, slug.as_deref(), chat_id, user_id)
                    .await
            },
            Command::UnlinkProject(slug) => {
                self.guarded(SlugOp::Unlink, slug.as_deref(), chat_id, user_id)
                    .await
            },
        };
        Some(reply)
    }

    async fn guarded(
        &self,
        op: SlugOp,
        slug: Option<&str>,
        chat_id: ChatId,
        user_id: Option<UserId>,
    ) -> String {
        self.gate
            .guard(user_id, op.name(), || self.run_slug_op(op, slug, chat_id))
            .await
    }

    async fn run_slug_op(&self, op: SlugOp, slug: Option<&str>, chat_id: ChatId) -> String {
        let Some(slug) = slug else {
            return strings::usage(op.name());
        };

        let reply = match op {
            SlugOp::Create => self.store.create_project(slug, chat_id).await.map(|p| {
                info!(slug, chat_id, "project created");
                strings::project_created(&p.slug)
            }),
            SlugOp::Bind => self.store.bind_customer(slug, chat_id).await.map(|p| {
                info!(slug, chat_id, "customer chat bound");
                strings::customer_bound(&p.slug)
            }),
            SlugOp::Unlink => self.store.unlink_chat(slug, chat_id).await.map(|p| {
                info!(slug, chat_id, is_active = p.is_active, "chat unlinked");
                strings::unlinked(&p)
            }),
        };
        reply.unwrap_or_else(store_error_reply)
    }

    async fn project_info(&self, chat_id: ChatId) -> String {
        match self.store.find_by_chat(chat_id).await {
            Ok(Some(project)) => match project.role_of(chat_id) {
                Some(role) => strings::project_info(&project, role),
                None => strings::CHAT_NOT_BOUND.to_string(),
            },
            Ok(None) => strings::CHAT_NOT_BOUND.to_string(),
            Err(e) => store_error_reply(e),
        }
    }

    async fn list_projects(&self) -> String {
        match self.store.list_projects().await {
            Ok(projects) if projects.is_empty() => strings::NO_PROJECTS.to_string(),
            Ok(projects) => projects
                .iter()
                .map(strings::project_line)
                .collect::<Vec<_>>()
                .join("\n"),
            Err(e) => store_error_reply(e),
        }
    }
}

fn store_error_reply(err: StoreError) -> String {
    match err {
        StoreError::AlreadyExists { slug } => strings::already_exists(&slug),
        StoreError::NotFound { slug } => strings::not_found(&slug),
        other => {
            error!(error = %other, "project store failure");
            strings::INTERNAL_ERROR.to_string()
        },
    }
}
