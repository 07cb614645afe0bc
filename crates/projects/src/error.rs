#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("project `{slug}` already exists")]
    AlreadyExists { slug: String },
    #[error("project `{slug}` not found")]
    NotFound { slug: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl Error {
    #[must_use]
    pub fn already_exists(slug: impl Into<String>) -> Self {
        Self::AlreadyExists { slug: slug.into() }
    }

    #[must_use]
    pub fn not_found(slug: impl Into<String>) -> Self {
        Self::NotFound { slug: slug.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
