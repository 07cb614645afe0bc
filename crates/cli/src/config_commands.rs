use std::path::{Path, PathBuf};

use {
    anyhow::{Context, Result, bail},
    clap::Subcommand,
    relay_config::{
        RelayConfig,
        validate::{self, Severity, ValidationResult},
    },
    secrecy::Secret,
};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write a documented default config file.
    Init {
        /// Destination (defaults to ./relay.toml).
        path: Option<PathBuf>,
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration (file, env and flags merged).
    Show {
        /// Print the bot token instead of masking it.
        #[arg(long)]
        show_secrets: bool,
    },
    /// Validate the configuration file and report errors/warnings.
    Check {
        /// Show informational diagnostics in addition to errors and warnings.
        #[arg(long)]
        verbose: bool,
    },
}

pub fn handle_config(
    action: ConfigAction,
    config_path: Option<&Path>,
    effective: &RelayConfig,
) -> Result<()> {
    match action {
        ConfigAction::Init { path, force } => {
            let path = path.unwrap_or_else(|| PathBuf::from("relay.toml"));
            init(&path, force)?;
            println!("Wrote {}", path.display());
            Ok(())
        },
        ConfigAction::Show { show_secrets } => {
            print!("{}", show(effective, show_secrets)?);
            Ok(())
        },
        ConfigAction::Check { verbose } => {
            let result = check(config_path, effective);
            report(&result, verbose);
            if result.has_errors() {
                std::process::exit(1);
            }
            Ok(())
        },
    }
}

fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, relay_config::template::default_config_template())
        .with_context(|| format!("failed to write {}", path.display()))
}

const MASK: &str = "********";

fn show(effective: &RelayConfig, show_secrets: bool) -> Result<String> {
    let mut config = effective.clone();
    if !show_secrets && config.telegram.has_token() {
        config.telegram.token = Secret::new(MASK.into());
    }
    Ok(relay_config::render_toml(&config)?)
}

/// File-level diagnostics for the config file, plus semantic checks on the
/// effective config so env overrides (e.g. `BOT_TOKEN`) count.
fn check(config_path: Option<&Path>, effective: &RelayConfig) -> ValidationResult {
    let mut result = validate::validate(config_path);
    result
        .diagnostics
        .retain(|d| !validate::SEMANTIC_CATEGORIES.contains(&d.category));
    result
        .diagnostics
        .extend(validate::validate_config(effective).diagnostics);
    result
}

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn report(result: &ValidationResult, verbose: bool) {
    if let Some(ref path) = result.config_path {
        eprintln!("Checking {}\n", path.display());
    } else {
        eprintln!("No config file found; checking defaults.\n");
    }

    let mut shown = 0;
    for d in &result.diagnostics {
        if d.severity == Severity::Info && !verbose {
            continue;
        }

        let (color, label) = match d.severity {
            Severity::Error => (RED, "error"),
            Severity::Warning => (YELLOW, "warning"),
            Severity::Info => (CYAN, "info"),
        };

        if d.path.is_empty() {
            eprintln!("  {BOLD}{color}{label}{RESET} {}", d.message);
        } else {
            eprintln!("  {BOLD}{color}{label}{RESET} {}: {}", d.path, d.message);
        }
        shown += 1;
    }

    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);

    if shown > 0 {
        eprintln!();
    }

    if errors == 0 && warnings == 0 {
        eprintln!("No issues found.");
    } else {
        eprintln!("{errors} error(s), {warnings} warning(s)");
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_writes_template_and_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("relay.toml");

        init(&path, false).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("[telegram]"));

        let err = init(&path, false).unwrap_err();
        assert!(err.to_string().contains("--force"));

        std::fs::write(&path, "# edited").unwrap();
        init(&path, true).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("[labels]"));
    }

    #[test]
    fn show_masks_token_by_default() {
        let mut config = RelayConfig::default();
        config.telegram.token = Secret::new("123:SECRET".into());

        let masked = show(&config, false).unwrap();
        assert!(!masked.contains("123:SECRET"));
        assert!(masked.contains(MASK));

        let revealed = show(&config, true).unwrap();
        assert!(revealed.contains("123:SECRET"));
    }

    #[test]
    fn show_leaves_empty_token_empty() {
        let shown = show(&RelayConfig::default(), false).unwrap();
        assert!(!shown.contains(MASK));
    }

    #[test]
    fn check_uses_effective_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.toml");
        // No token in the file; it comes from the environment at runtime.
        std::fs::write(&path, "[admin]\nuser_ids = [1]\n").unwrap();

        let mut effective = relay_config::load_config(&path).unwrap();
        effective.telegram.token = Secret::new("1:env".into());

        let result = check(Some(&path), &effective);
        assert!(!result.has_errors(), "{:?}", result.diagnostics);
        assert_eq!(result.config_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn check_keeps_file_level_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.toml");
        std::fs::write(&path, "[telegram]\ntokn = \"x\"\n").unwrap();

        let result = check(Some(&path), &RelayConfig::default());
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.category == "unknown-field")
        );
        // Missing token reported once, from the effective config.
        let missing = result
            .diagnostics
            .iter()
            .filter(|d| d.path == "telegram.token")
            .count();
        assert_eq!(missing, 1);
    }
}
