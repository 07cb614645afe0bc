use std::{sync::Arc, time::Duration};

use {
    relay_config::RelayConfig,
    relay_projects::ProjectStore,
    secrecy::ExposeSecret,
    teloxide::{
        ApiError, RequestError,
        prelude::*,
        types::{AllowedUpdate, UpdateKind},
    },
    tokio_util::sync::CancellationToken,
    tracing::{debug, error, info, warn},
};

use crate::{
    Error, Result,
    access::AdminGate,
    commands::bot_commands,
    handlers::{BotIdentity, UpdateHandler},
    outbound::TelegramOutbound,
    queue::ChatQueues,
};

/// Pause after a failed `getUpdates` before polling again.
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// A chat worker with nothing to do for this long is stopped.
const IDLE_WORKER_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// A connected bot, ready to poll.
pub struct RelayBot {
    bot: Bot,
    identity: BotIdentity,
    handler: Arc<UpdateHandler>,
    poll_timeout_secs: u32,
}

impl RelayBot {
    /// Verify the token, clear any webhook, and register slash commands.
    pub async fn connect(config: &RelayConfig, store: Arc<dyn ProjectStore>) -> Result<Self> {
        let telegram = &config.telegram;
        if !telegram.has_token() {
            return Err(Error::message("telegram bot token is not configured"));
        }

        // HTTP timeout must outlast the long-polling timeout.
        let client = teloxide::net::default_reqwest_settings()
            .timeout(Duration::from_secs(u64::from(telegram.poll_timeout_secs) + 15))
            .build()?;
        let mut bot = Bot::with_client(telegram.token.expose_secret(), client);
        if let Some(url) = &telegram.api_url {
            let url = reqwest::Url::parse(url).map_err(|e| Error::external("parse api_url", e))?;
            bot = bot.set_api_url(url);
        }

        Self::connect_with(bot, config, store).await
    }

    /// Same as [`RelayBot::connect`] with a pre-built client.
    pub async fn connect_with(
        bot: Bot,
        config: &RelayConfig,
        store: Arc<dyn ProjectStore>,
    ) -> Result<Self> {
        let me = bot.get_me().await?;
        let identity = BotIdentity {
            user_id: me.id.0,
            username: me.username.clone(),
        };

        bot.delete_webhook()
            .drop_pending_updates(config.telegram.drop_pending_updates)
            .await?;

        if let Err(e) = bot.set_my_commands(bot_commands()).await {
            warn!(error = %e, "failed to register bot commands");
        }

        info!(
            username = ?identity.username,
            admins = config.admin.user_ids.len(),
            "telegram bot connected (webhook cleared)"
        );

        let handler = Arc::new(UpdateHandler::new(
            identity.clone(),
            Arc::new(TelegramOutbound::new(bot.clone())),
            store,
            AdminGate::new(config.admin.user_ids.iter().copied()),
            config.labels.clone(),
        ));

        Ok(Self {
            bot,
            identity,
            handler,
            poll_timeout_secs: config.telegram.poll_timeout_secs,
        })
    }

    pub fn identity(&self) -> &BotIdentity {
        &self.identity
    }

    /// Long-poll for updates until `cancel` fires, then drain every chat
    /// queue before returning.
    pub async fn run(self, cancel: CancellationToken) -> Result<()> {
        let mut queues = ChatQueues::new(Arc::clone(&self.handler));
        let mut offset: i32 = 0;
        info!("starting telegram polling loop");

        let result = loop {
            let request = self
                .bot
                .get_updates()
                .offset(offset)
                .timeout(self.poll_timeout_secs)
                .allowed_updates(vec![AllowedUpdate::Message, AllowedUpdate::ChannelPost]);

            let updates = tokio::select! {
                () = cancel.cancelled() => break Ok(()),
                updates = request.send() => updates,
            };

            match updates {
                Ok(updates) => {
                    if !updates.is_empty() {
                        debug!(count = updates.len(), "got telegram updates");
                    }
                    for update in updates {
                        offset = update.id.as_offset();
                        match update.kind {
                            UpdateKind::Message(msg) | UpdateKind::ChannelPost(msg) => {
                                queues.dispatch(msg);
                            },
                            other => debug!("ignoring non-message update: {other:?}"),
                        }
                    }
                    let reaped = queues.reap_idle(IDLE_WORKER_TIMEOUT);
                    if reaped > 0 {
                        debug!(reaped, chats = queues.len(), "stopped idle chat workers");
                    }
                },
                Err(RequestError::Api(ApiError::TerminatedByOtherGetUpdates)) => {
                    error!("another bot instance is already running with this token");
                    break Err(Error::message(
                        "another bot instance is already polling with this token",
                    ));
                },
                Err(e) => {
                    warn!(error = %e, "telegram getUpdates failed");
                    tokio::select! {
                        () = cancel.cancelled() => break Ok(()),
                        () = tokio::time::sleep(POLL_ERROR_BACKOFF) => {},
                    }
                },
            }
        };

        info!(chats = queues.len(), "telegram polling stopped");
        queues.shutdown().await;
        result
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*, crate::test_support::MockTelegramApi, relay_projects::MemoryProjectStore,
        secrecy::Secret,
    };

    #[tokio::test]
    async fn connect_requires_token() {
        let store = Arc::new(MemoryProjectStore::new());
        let err = RelayBot::connect(&RelayConfig::default(), store)
            .await
            .err()
            .expect("missing token must fail");
        assert!(err.to_string().contains("token"));
    }

    #[tokio::test]
    async fn connect_then_stop_on_cancel() {
        let api = MockTelegramApi::default();
        let server = api.clone().start().await;
        let mut config = RelayConfig::default();
        config.telegram.token = Secret::new("test-token".into());

        let bot = RelayBot::connect_with(
            server.bot.clone(),
            &config,
            Arc::new(MemoryProjectStore::new()),
        )
        .await
        .unwrap();
        assert_eq!(bot.identity().user_id, 999);
        assert_eq!(bot.identity().username.as_deref(), Some("relay_bot"));

        let cancel = CancellationToken::new();
        let task = tokio::spawn(bot.run(cancel.clone()));
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
        task.await.unwrap().unwrap();

        let methods: Vec<String> = api.requests().into_iter().map(|r| r.method).collect();
        assert!(methods.contains(&"DeleteWebhook".to_string()));
        assert!(methods.contains(&"SetMyCommands".to_string()));
        assert!(methods.contains(&"GetUpdates".to_string()));
        server.stop().await;
    }
}
