use std::{collections::BTreeMap, path::Path};

use {
    async_trait::async_trait,
    relay_common::ChatId,
    sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    tokio::sync::RwLock,
    tracing::{debug, info},
};

use crate::{
    Error, Result,
    types::Project,
};

/// Trait for persisting project bindings. Implementations can be SQLite,
/// in-memory, etc.
///
/// Every mutation is atomic with respect to a single project: a concurrent
/// reader never sees half of an update.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Create a project with `executor_chat_id` bound and no customer.
    async fn create_project(&self, slug: &str, executor_chat_id: ChatId) -> Result<Project>;
    /// Bind (or rebind) the customer endpoint and reactivate the project.
    async fn bind_customer(&self, slug: &str, customer_chat_id: ChatId) -> Result<Project>;
    /// Clear the endpoint equal to `chat_id`, or deactivate if neither matches.
    async fn unlink_chat(&self, slug: &str, chat_id: ChatId) -> Result<Project>;
    /// Project with either endpoint equal to `chat_id`.
    ///
    /// Nothing prevents one chat from being bound into several projects; when
    /// that happens active projects win, then the lowest slug.
    async fn find_by_chat(&self, chat_id: ChatId) -> Result<Option<Project>>;
    async fn get(&self, slug: &str) -> Result<Option<Project>>;
    /// All projects, sorted by slug ascending.
    async fn list_projects(&self) -> Result<Vec<Project>>;
}

// ── In-memory implementation ────────────────────────────────────────

/// Keeps projects in a slug-ordered map behind an async lock.
#[derive(Default)]
pub struct MemoryProjectStore {
    projects: RwLock<BTreeMap<String, Project>>,
}

impl MemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectStore for MemoryProjectStore {
    async fn create_project(&self, slug: &str, executor_chat_id: ChatId) -> Result<Project> {
        let mut projects = self.projects.write().await;
        if projects.contains_key(slug) {
            return Err(Error::already_exists(slug));
        }
        let project = Project::new(slug, executor_chat_id);
        projects.insert(slug.to_string(), project.clone());
        Ok(project)
    }

    async fn bind_customer(&self, slug: &str, customer_chat_id: ChatId) -> Result<Project> {
        let mut projects = self.projects.write().await;
        let project = projects
            .get_mut(slug)
            .ok_or_else(|| Error::not_found(slug))?;
        project.bind_customer(customer_chat_id);
        Ok(project.clone())
    }

    async fn unlink_chat(&self, slug: &str, chat_id: ChatId) -> Result<Project> {
        let mut projects = self.projects.write().await;
        let project = projects
            .get_mut(slug)
            .ok_or_else(|| Error::not_found(slug))?;
        let outcome = project.unlink(chat_id);
        debug!(slug, chat_id, ?outcome, "unlinked chat");
        Ok(project.clone())
    }

    async fn find_by_chat(&self, chat_id: ChatId) -> Result<Option<Project>> {
        let projects = self.projects.read().await;
        let matches: Vec<&Project> = projects
            .values()
            .filter(|p| p.role_of(chat_id).is_some())
            .collect();
        Ok(matches
            .iter()
            .find(|p| p.is_active)
            .or_else(|| matches.first())
            .map(|p| (*p).clone()))
    }

    async fn get(&self, slug: &str) -> Result<Option<Project>> {
        Ok(self.projects.read().await.get(slug).cloned())
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        Ok(self.projects.read().await.values().cloned().collect())
    }
}

// ── SQLite-backed implementation ────────────────────────────────────

/// Stores projects in a SQLite database.
///
/// Each mutation is a single statement, so SQLite's own write lock
/// serializes concurrent updates to the same row.
pub struct SqliteProjectStore {
    pool: sqlx::SqlitePool,
}

impl SqliteProjectStore {
    /// Open (creating if needed) the database file at `path` and run
    /// migrations.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        crate::run_migrations(&pool).await?;
        info!(path = %path.display(), "project database ready");
        Ok(Self { pool })
    }

    /// A private in-memory database.
    pub async fn in_memory() -> Result<Self> {
        // Every connection to `sqlite::memory:` is its own database, so the
        // pool must never open a second one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        crate::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &sqlx::SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ProjectStore for SqliteProjectStore {
    async fn create_project(&self, slug: &str, executor_chat_id: ChatId) -> Result<Project> {
        let result = sqlx::query(
            "INSERT INTO projects (slug, executor_chat_id, is_active) VALUES (?, ?, 1)",
        )
        .bind(slug)
        .bind(executor_chat_id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(Project::new(slug, executor_chat_id)),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(Error::already_exists(slug))
            },
            Err(e) => Err(e.into()),
        }
    }

    async fn bind_customer(&self, slug: &str, customer_chat_id: ChatId) -> Result<Project> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"UPDATE projects SET customer_chat_id = ?, is_active = 1
               WHERE slug = ?
               RETURNING slug, customer_chat_id, executor_chat_id, is_active"#,
        )
        .bind(customer_chat_id)
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Into::into).ok_or_else(|| Error::not_found(slug))
    }

    async fn unlink_chat(&self, slug: &str, chat_id: ChatId) -> Result<Project> {
        // SET expressions all see the pre-update row, which gives the
        // executor-first tie-break without a read-modify-write round trip.
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"UPDATE projects SET
                 executor_chat_id = CASE WHEN executor_chat_id = ? THEN NULL
                                         ELSE executor_chat_id END,
                 customer_chat_id = CASE WHEN executor_chat_id IS NOT ? AND customer_chat_id = ?
                                         THEN NULL ELSE customer_chat_id END,
                 is_active        = CASE WHEN executor_chat_id = ? OR customer_chat_id = ?
                                         THEN 1 ELSE 0 END
               WHERE slug = ?
               RETURNING slug, customer_chat_id, executor_chat_id, is_active"#,
        )
        .bind(chat_id)
        .bind(chat_id)
        .bind(chat_id)
        .bind(chat_id)
        .bind(chat_id)
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        let project: Project = row.map(Into::into).ok_or_else(|| Error::not_found(slug))?;
        debug!(
            slug,
            chat_id,
            is_active = project.is_active,
            "unlinked chat"
        );
        Ok(project)
    }

    async fn find_by_chat(&self, chat_id: ChatId) -> Result<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"SELECT slug, customer_chat_id, executor_chat_id, is_active FROM projects
               WHERE executor_chat_id = ? OR customer_chat_id = ?
               ORDER BY is_active DESC, slug ASC
               LIMIT 1"#,
        )
        .bind(chat_id)
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn get(&self, slug: &str) -> Result<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(
            "SELECT slug, customer_chat_id, executor_chat_id, is_active FROM projects WHERE slug = ?",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            "SELECT slug, customer_chat_id, executor_chat_id, is_active FROM projects ORDER BY slug",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Internal row type for sqlx mapping.
#[derive(sqlx::FromRow)]
struct ProjectRow {
    slug: String,
    customer_chat_id: Option<i64>,
    executor_chat_id: Option<i64>,
    is_active: i32,
}

impl From<ProjectRow> for Project {
    fn from(r: ProjectRow) -> Self {
        Self {
            slug: r.slug,
            customer_chat_id: r.customer_chat_id,
            executor_chat_id: r.executor_chat_id,
            is_active: r.is_active != 0,
        }
    }
}
