mod config_commands;
mod db_commands;
mod project_commands;

use std::{path::PathBuf, sync::Arc};

use {
    anyhow::Context,
    clap::{Parser, Subcommand},
    relay_config::RelayConfig,
    relay_projects::{ProjectStore, SqliteProjectStore},
    relay_telegram::RelayBot,
    secrecy::Secret,
    tokio_util::sync::CancellationToken,
    tracing::{error, info},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "relay", about = "Relay: anonymous customer/executor chat bridge")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (overrides discovery of ./relay.toml and the user config dir).
    #[arg(long, global = true, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,
    /// Project database path (overrides config and DATABASE_PATH).
    #[arg(long, global = true)]
    database: Option<PathBuf>,
    /// Bot token (overrides config and BOT_TOKEN).
    #[arg(long, global = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot (default when no subcommand is provided).
    Run,
    /// Manage projects directly in the database.
    Projects {
        #[command(subcommand)]
        action: project_commands::ProjectAction,
    },
    /// Database management (migrate, reset).
    Db {
        #[command(subcommand)]
        action: db_commands::DbAction,
    },
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Effective configuration: file, then environment, then CLI flags.
fn load_config(cli: &Cli) -> anyhow::Result<RelayConfig> {
    let mut config = match &cli.config {
        Some(path) => relay_config::load_config(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => relay_config::discover_and_load(),
    };
    relay_config::apply_env_overrides(&mut config)?;
    apply_cli_overrides(cli, &mut config);
    Ok(config)
}

fn apply_cli_overrides(cli: &Cli, config: &mut RelayConfig) {
    if let Some(path) = &cli.database {
        config.database.path = path.clone();
    }
    if let Some(token) = cli.token.as_ref().filter(|t| !t.trim().is_empty()) {
        config.telegram.token = Secret::new(token.clone());
    }
}

/// Open the project database. Failure here is fatal for every command.
async fn open_store(config: &RelayConfig) -> anyhow::Result<SqliteProjectStore> {
    let path = &config.database.path;
    SqliteProjectStore::open(path)
        .await
        .with_context(|| format!("failed to open project database at {}", path.display()))
}

async fn run_bot(config: RelayConfig) -> anyhow::Result<()> {
    let store: Arc<dyn ProjectStore> = Arc::new(open_store(&config).await?);
    let bot = RelayBot::connect(&config, store).await?;

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("shutdown requested"),
            Err(e) => error!(error = %e, "failed to listen for ctrl-c"),
        }
        shutdown.cancel();
    });

    bot.run(cancel).await?;
    info!("relay stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "relay starting");

    let config = load_config(&cli)?;
    match cli.command {
        None | Some(Commands::Run) => run_bot(config).await,
        Some(Commands::Projects { action }) => {
            let store = open_store(&config).await?;
            project_commands::handle_projects(action, &store).await
        },
        Some(Commands::Db { action }) => db_commands::handle_db(action, &config).await,
        Some(Commands::Config { action }) => {
            config_commands::handle_config(action, cli.config.as_deref(), &config)
        },
    }
}
