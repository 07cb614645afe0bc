//! Configuration validation.
//!
//! Detects syntax errors, unknown/misspelled fields, and settings that would
//! leave the relay unusable (no token, no admins, indistinguishable labels).

use std::{collections::HashMap, path::Path};

use crate::schema::RelayConfig;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "syntax", "unknown-field", "type-error", "missing", "labels", "file-ref"
    pub category: &'static str,
    /// Dotted path, e.g. "telegram.token"
    pub path: String,
    pub message: String,
}

/// Result of validating a configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<std::path::PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

// ── Schema tree for unknown-field detection ─────────────────────────────────

enum KnownKeys {
    Struct(HashMap<&'static str, KnownKeys>),
    Leaf,
}

fn build_schema_map() -> KnownKeys {
    use KnownKeys::{Leaf, Struct};

    Struct(HashMap::from([
        (
            "telegram",
            Struct(HashMap::from([
                ("token", Leaf),
                ("poll_timeout_secs", Leaf),
                ("drop_pending_updates", Leaf),
                ("api_url", Leaf),
            ])),
        ),
        ("admin", Struct(HashMap::from([("user_ids", Leaf)]))),
        ("database", Struct(HashMap::from([("path", Leaf)]))),
        (
            "labels",
            Struct(HashMap::from([
                ("customer", Leaf),
                ("executor", Leaf),
                ("media_placeholder", Leaf),
                ("unknown_placeholder", Leaf),
                ("delivery_failed", Leaf),
            ])),
        ),
    ]))
}

// ── Levenshtein distance ────────────────────────────────────────────────────

/// Edit distance between two strings, counted in chars.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_chars.len()]
}

/// Closest candidate within `max_distance` edits, if any.
fn suggest<'a>(needle: &str, candidates: &[&'a str], max_distance: usize) -> Option<&'a str> {
    candidates
        .iter()
        .map(|c| (*c, levenshtein(needle, c)))
        .filter(|(_, d)| *d > 0 && *d <= max_distance)
        .min_by_key(|(_, d)| *d)
        .map(|(c, _)| c)
}

// ── Core validation ─────────────────────────────────────────────────────────

/// Validate a config file at the given path, or the discovered config file
/// if `path` is `None`.
#[must_use]
pub fn validate(path: Option<&Path>) -> ValidationResult {
    let config_path = path
        .map(Path::to_path_buf)
        .or_else(crate::loader::find_config_file);

    let Some(actual_path) = config_path else {
        let mut result = validate_config(&RelayConfig::default());
        result.diagnostics.insert(0, Diagnostic {
            severity: Severity::Info,
            category: "file-ref",
            path: String::new(),
            message: "no config file found; using defaults".into(),
        });
        return result;
    };

    let is_toml = actual_path
        .extension()
        .is_none_or(|ext| ext.eq_ignore_ascii_case("toml"));

    let mut result = if is_toml {
        match std::fs::read_to_string(&actual_path) {
            Ok(content) => validate_toml_str(&crate::env_subst::substitute_env(&content)),
            Err(e) => ValidationResult {
                diagnostics: vec![Diagnostic {
                    severity: Severity::Error,
                    category: "syntax",
                    path: String::new(),
                    message: format!("failed to read config file: {e}"),
                }],
                config_path: None,
            },
        }
    } else {
        // YAML/JSON: no unknown-field walk, only a full parse.
        match crate::loader::load_config(&actual_path) {
            Ok(config) => validate_config(&config),
            Err(e) => ValidationResult {
                diagnostics: vec![Diagnostic {
                    severity: Severity::Error,
                    category: "type-error",
                    path: String::new(),
                    message: e.to_string(),
                }],
                config_path: None,
            },
        }
    };
    result.config_path = Some(actual_path);
    result
}

/// Validate a TOML string without file-system side effects.
#[must_use]
pub fn validate_toml_str(toml_str: &str) -> ValidationResult {
    let mut diagnostics = Vec::new();

    let toml_value: toml::Value = match toml::from_str(toml_str) {
        Ok(v) => v,
        Err(e) => {
            diagnostics.push(Diagnostic {
                severity: Severity::Error,
                category: "syntax",
                path: String::new(),
                message: format!("TOML syntax error: {e}"),
            });
            return ValidationResult {
                diagnostics,
                config_path: None,
            };
        },
    };

    check_unknown_fields(&toml_value, &build_schema_map(), "", &mut diagnostics);

    match toml::from_str::<RelayConfig>(toml_str) {
        Ok(config) => check_semantics(&config, &mut diagnostics),
        Err(e) => diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "type-error",
            path: String::new(),
            message: format!("type error: {e}"),
        }),
    }

    ValidationResult {
        diagnostics,
        config_path: None,
    }
}

/// Categories produced by the semantic checks, as opposed to file-level
/// problems (syntax, unknown fields, type errors).
pub const SEMANTIC_CATEGORIES: &[&str] = &["missing", "polling", "labels"];

/// Semantic checks on an already-parsed config (env overrides applied).
#[must_use]
pub fn validate_config(config: &RelayConfig) -> ValidationResult {
    let mut diagnostics = Vec::new();
    check_semantics(config, &mut diagnostics);
    ValidationResult {
        diagnostics,
        config_path: None,
    }
}

fn check_unknown_fields(
    value: &toml::Value,
    schema: &KnownKeys,
    prefix: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let (toml::Value::Table(table), KnownKeys::Struct(fields)) = (value, schema) else {
        return;
    };
    let known_keys: Vec<&str> = fields.keys().copied().collect();
    for (key, child_value) in table {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        if let Some(child_schema) = fields.get(key.as_str()) {
            check_unknown_fields(child_value, child_schema, &path, diagnostics);
            continue;
        }
        let message = match suggest(key, &known_keys, 3) {
            Some(s) => format!("unknown field (did you mean \"{s}\"?)"),
            None => "unknown field".to_string(),
        };
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "unknown-field",
            path,
            message,
        });
    }
}

fn check_semantics(config: &RelayConfig, diagnostics: &mut Vec<Diagnostic>) {
    if !config.telegram.has_token() {
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "missing",
            path: "telegram.token".into(),
            message: "bot token is empty (set telegram.token or BOT_TOKEN)".into(),
        });
    }

    if config.admin.user_ids.is_empty() {
        diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            category: "missing",
            path: "admin.user_ids".into(),
            message: "no admins configured; projects can only be managed from the CLI".into(),
        });
    }

    if config.telegram.poll_timeout_secs == 0 {
        diagnostics.push(Diagnostic {
            severity: Severity::Info,
            category: "polling",
            path: "telegram.poll_timeout_secs".into(),
            message: "0 disables long polling and turns getUpdates into a busy loop".into(),
        });
    }

    let labels = &config.labels;
    for (name, value) in [
        ("labels.customer", &labels.customer),
        ("labels.executor", &labels.executor),
    ] {
        if value.trim().is_empty() {
            diagnostics.push(Diagnostic {
                severity: Severity::Error,
                category: "labels",
                path: name.into(),
                message: "role label must not be empty".into(),
            });
        }
    }
    if labels.customer.trim() == labels.executor.trim() && !labels.customer.trim().is_empty() {
        diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            category: "labels",
            path: "labels".into(),
            message: "customer and executor labels are identical; recipients cannot tell the sides apart"
                .into(),
        });
    }
}
