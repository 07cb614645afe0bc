use std::path::{Path, PathBuf};

use {
    anyhow::Context,
    clap::Subcommand,
    relay_config::RelayConfig,
    relay_projects::SqliteProjectStore,
};

#[derive(Subcommand)]
pub enum DbAction {
    /// Delete the project database completely (including WAL/SHM files).
    Reset,
    /// Create the database if needed and run pending migrations.
    Migrate,
}

pub async fn handle_db(action: DbAction, config: &RelayConfig) -> anyhow::Result<()> {
    let path = &config.database.path;
    match action {
        DbAction::Reset => {
            let deleted = reset_database(path)?;
            if deleted.is_empty() {
                println!("No database files found.");
            } else {
                for file in &deleted {
                    println!("Deleted: {}", file.display());
                }
                println!("Database files deleted. Run `relay db migrate` to recreate them.");
            }
            Ok(())
        },
        DbAction::Migrate => {
            run_migrations(path).await?;
            println!("Migrations complete: {}", path.display());
            Ok(())
        },
    }
}

/// SQLite's companion files sit next to the database with a suffix appended
/// to the full file name (`relay.db-wal`).
fn sidecar_paths(db: &Path) -> [PathBuf; 3] {
    let with_suffix = |suffix: &str| {
        let mut name = db.as_os_str().to_os_string();
        name.push(suffix);
        PathBuf::from(name)
    };
    [db.to_path_buf(), with_suffix("-wal"), with_suffix("-shm")]
}

/// Delete the database and its sidecars; returns what was removed.
fn reset_database(db: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut deleted = Vec::new();
    for path in sidecar_paths(db) {
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("failed to delete {}", path.display()))?;
            deleted.push(path);
        }
    }
    Ok(deleted)
}

async fn run_migrations(db: &Path) -> anyhow::Result<()> {
    // Opening the store creates the file and applies migrations.
    let store = SqliteProjectStore::open(db)
        .await
        .with_context(|| format!("failed to migrate {}", db.display()))?;
    store.pool().close().await;
    Ok(())
}
