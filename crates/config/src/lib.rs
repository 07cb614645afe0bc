//! Configuration loading, env overrides, and validation for the relay.
//!
//! Config files: `relay.toml`, `relay.yaml`, `relay.yml`, or `relay.json`,
//! searched in `./` then the user config dir (`~/.config/relay/` on Linux).
//!
//! Supports `${ENV_VAR}` substitution in all string values, and the
//! `BOT_TOKEN`, `ADMIN_USER_ID`, `DATABASE_PATH` environment overrides.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod template;
pub mod validate;

pub use {
    error::{Error, Result},
    loader::{
        apply_env_overrides, config_dir, discover_and_load, find_config_file, load_config,
        render_toml,
    },
    schema::{AdminConfig, DatabaseConfig, LabelsConfig, RelayConfig, TelegramConfig},
    validate::{Diagnostic, Severity, ValidationResult},
};
