/// Config schema types (telegram, admin, database, labels).
use std::path::PathBuf;

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Admin used when neither the config file nor `ADMIN_USER_ID` names one.
pub const DEFAULT_ADMIN_USER_ID: u64 = 5386753143;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub telegram: TelegramConfig,
    pub admin: AdminConfig,
    pub database: DatabaseConfig,
    pub labels: LabelsConfig,
}

/// Telegram bot connection settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token from @BotFather.
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,

    /// Long-polling timeout passed to `getUpdates` (seconds).
    pub poll_timeout_secs: u32,

    /// Skip updates that queued up while the bot was offline.
    pub drop_pending_updates: bool,

    /// Custom Bot API base URL (self-hosted API servers, tests).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"[REDACTED]")
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("drop_pending_updates", &self.drop_pending_updates)
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl TelegramConfig {
    #[must_use]
    pub fn has_token(&self) -> bool {
        !self.token.expose_secret().trim().is_empty()
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            poll_timeout_secs: 30,
            drop_pending_updates: true,
            api_url: None,
        }
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// Who may run privileged commands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AdminConfig {
    /// Telegram user ids allowed to create, bind, unlink, and list projects.
    pub user_ids: Vec<u64>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            user_ids: vec![DEFAULT_ADMIN_USER_ID],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file holding project bindings.
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./projects.db"),
        }
    }
}

/// User-visible strings attached to relayed messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LabelsConfig {
    /// Prefix on messages that came from the customer chat.
    pub customer: String,
    /// Prefix on messages that came from the executor chat.
    pub executor: String,
    /// Body for attachments that arrive without a caption.
    pub media_placeholder: String,
    /// Body for message kinds the relay cannot re-send.
    pub unknown_placeholder: String,
    /// Reply to the sender when forwarding fails.
    pub delivery_failed: String,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            customer: "👤 Клиент:".into(),
            executor: "🧑‍🎨 Команда:".into(),
            media_placeholder: "(вложение)".into(),
            unknown_placeholder: "(неизвестный тип сообщения)".into(),
            delivery_failed: "Не удалось переслать сообщение. Проверьте настройки бота.".into(),
        }
    }
}
