//! Default configuration template with every option documented.
//!
//! Written by `relay config init`. All values shown are the built-in
//! defaults, so an untouched file behaves exactly like no file at all
//! (apart from the token).

use crate::schema::DEFAULT_ADMIN_USER_ID;

/// Generate the default config template.
pub fn default_config_template() -> String {
    format!(
        r##"# Relay Configuration
# ===================
# Environment variable substitution is supported: ${{ENV_VAR}}
# BOT_TOKEN, ADMIN_USER_ID and DATABASE_PATH override the values below.

[telegram]
token = "${{BOT_TOKEN}}"          # Bot token from @BotFather
poll_timeout_secs = 30            # Long-polling timeout for getUpdates
drop_pending_updates = true       # Skip updates queued while the bot was offline
# api_url = "http://localhost:8081/"   # Self-hosted Bot API server

[admin]
user_ids = [{DEFAULT_ADMIN_USER_ID}]        # Telegram user ids allowed to manage projects

[database]
path = "./projects.db"            # SQLite file with project bindings

[labels]
customer = "👤 Клиент:"
executor = "🧑‍🎨 Команда:"
media_placeholder = "(вложение)"
unknown_placeholder = "(неизвестный тип сообщения)"
delivery_failed = "Не удалось переслать сообщение. Проверьте настройки бота."
"##
    )
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, crate::RelayConfig};

    #[test]
    fn template_parses_to_defaults() {
        let cfg: RelayConfig = toml::from_str(&default_config_template()).unwrap();
        let defaults = RelayConfig::default();
        assert_eq!(cfg.admin, defaults.admin);
        assert_eq!(cfg.database, defaults.database);
        assert_eq!(cfg.labels, defaults.labels);
        assert_eq!(
            cfg.telegram.poll_timeout_secs,
            defaults.telegram.poll_timeout_secs
        );
    }
}
