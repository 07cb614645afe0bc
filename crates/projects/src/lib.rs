//! Project bindings for the relay.
//!
//! A project ties one customer chat to one executor chat under a
//! human-chosen slug. Messages are relayed between the two endpoints only
//! while the project is active.

pub mod error;
pub mod store;
pub mod types;

pub use {
    error::{Error, Result},
    store::{MemoryProjectStore, ProjectStore, SqliteProjectStore},
    types::{Project, UnlinkOutcome},
};

/// Run database migrations for the projects crate.
///
/// This creates the `projects` table and its chat-id indexes. Must be called
/// at startup before using [`SqliteProjectStore`].
pub async fn run_migrations(pool: &sqlx::SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
