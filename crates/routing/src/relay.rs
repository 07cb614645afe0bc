use std::sync::Arc;

use {
    relay_channels::{InboundMessage, RelayOutbound},
    relay_common::{ChatId, Role, UserId},
    relay_config::LabelsConfig,
    relay_projects::ProjectStore,
    tracing::{debug, error, info, warn},
};

use crate::{
    Result,
    plan::{Outgoing, plan_forward},
    resolve::{DropReason, Route, resolve_route},
};

/// What happened to one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    Forwarded {
        slug: String,
        to: ChatId,
        role: Role,
    },
    Dropped(DropReason),
    /// Authored by a bot account (including this relay).
    IgnoredBot,
    /// Delivery failed; the source chat was told on a best-effort basis.
    Failed { slug: String, to: ChatId },
}

/// Forwards messages between the two endpoints of a project.
pub struct Relay {
    store: Arc<dyn ProjectStore>,
    outbound: Arc<dyn RelayOutbound>,
    labels: LabelsConfig,
    bot_user_id: Option<UserId>,
}

impl Relay {
    pub fn new(
        store: Arc<dyn ProjectStore>,
        outbound: Arc<dyn RelayOutbound>,
        labels: LabelsConfig,
    ) -> Self {
        Self {
            store,
            outbound,
            labels,
            bot_user_id: None,
        }
    }

    /// Remember the relay's own user id so its messages are never routed,
    /// even if the platform omits the bot flag.
    #[must_use]
    pub fn with_bot_user_id(mut self, bot_user_id: UserId) -> Self {
        self.bot_user_id = Some(bot_user_id);
        self
    }

    /// Route one inbound message.
    ///
    /// Delivery failures are absorbed here. Only a store failure is returned.
    pub async fn handle(&self, msg: &InboundMessage) -> Result<RelayOutcome> {
        if let Some(author) = msg.author
            && (author.is_bot || Some(author.user_id) == self.bot_user_id)
        {
            debug!(chat_id = msg.chat_id, "relay: ignoring bot message");
            return Ok(RelayOutcome::IgnoredBot);
        }

        let project = self.store.find_by_chat(msg.chat_id).await?;
        let (to, role) = match resolve_route(project.as_ref(), msg.chat_id) {
            Route::Forward { to, role } => (to, role),
            Route::Drop(reason) => {
                debug!(
                    chat_id = msg.chat_id,
                    slug = project.as_ref().map(|p| p.slug.as_str()),
                    reason = reason.as_str(),
                    "relay: dropped"
                );
                return Ok(RelayOutcome::Dropped(reason));
            },
        };
        let Some(slug) = project.map(|p| p.slug) else {
            return Ok(RelayOutcome::Dropped(DropReason::Unbound));
        };

        let outgoing = plan_forward(&msg.payload, role, &self.labels);
        let delivery = match &outgoing {
            Outgoing::Text(text) => self.outbound.send_text(to, text).await,
            Outgoing::Media {
                media,
                file_id,
                caption,
            } => {
                self.outbound
                    .send_media(to, *media, file_id, Some(caption))
                    .await
            },
        };

        match delivery {
            Ok(()) => {
                info!(
                    slug = %slug,
                    from = msg.chat_id,
                    to,
                    role = %role,
                    kind = msg.payload.kind_name(),
                    "relay: forwarded"
                );
                Ok(RelayOutcome::Forwarded { slug, to, role })
            },
            Err(e) => {
                error!(
                    slug = %slug,
                    from = msg.chat_id,
                    to,
                    role = %role,
                    kind = msg.payload.kind_name(),
                    error = %e,
                    "relay: delivery failed"
                );
                if let Err(notice_err) = self
                    .outbound
                    .send_text(msg.chat_id, &self.labels.delivery_failed)
                    .await
                {
                    warn!(
                        chat_id = msg.chat_id,
                        error = %notice_err,
                        "relay: failed to notify sender about delivery failure"
                    );
                }
                Ok(RelayOutcome::Failed { slug, to })
            },
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use {
        super::*,
        async_trait::async_trait,
        relay_channels::{Author, MediaKind, Payload},
        relay_projects::MemoryProjectStore,
    };

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Sent {
        Text(ChatId, String),
        Media(ChatId, MediaKind, String, Option<String>),
    }

    #[derive(Default)]
    struct RecordingOutbound {
        sent: Mutex<Vec<Sent>>,
        /// Chats that reject every send.
        broken: Vec<ChatId>,
    }

    impl RecordingOutbound {
        fn sent(&self) -> Vec<Sent> {
            self.sent.lock().unwrap().clone()
        }

        fn check(&self, to: ChatId) -> relay_channels::Result<()> {
            if self.broken.contains(&to) {
                return Err(relay_channels::Error::transport(
                    "send",
                    std::io::Error::other("chat not found"),
                ));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl RelayOutbound for RecordingOutbound {
        async fn send_text(&self, to: ChatId, text: &str) -> relay_channels::Result<()> {
            self.check(to)?;
            self.sent.lock().unwrap().push(Sent::Text(to, text.into()));
            Ok(())
        }

        async fn send_media(
            &self,
            to: ChatId,
            media: MediaKind,
            file_id: &str,
            caption: Option<&str>,
        ) -> relay_channels::Result<()> {
            self.check(to)?;
            self.sent.lock().unwrap().push(Sent::Media(
                to,
                media,
                file_id.into(),
                caption.map(Into::into),
            ));
            Ok(())
        }
    }

    fn inbound(chat_id: ChatId, user_id: UserId, payload: Payload) -> InboundMessage {
        InboundMessage {
            chat_id,
            author: Some(Author {
                user_id,
                is_bot: false,
            }),
            payload,
        }
    }

    async fn bound_store() -> Arc<MemoryProjectStore> {
        let store = Arc::new(MemoryProjectStore::new());
        store.create_project("p", 111).await.unwrap();
        store.bind_customer("p", 222).await.unwrap();
        store
    }

    fn relay(store: Arc<MemoryProjectStore>, outbound: Arc<RecordingOutbound>) -> Relay {
        Relay::new(store, outbound, LabelsConfig::default()).with_bot_user_id(999)
    }

    #[tokio::test]
    async fn executor_text_reaches_customer() {
        let out = Arc::new(RecordingOutbound::default());
        let relay = relay(bound_store().await, out.clone());

        let outcome = relay
            .handle(&inbound(111, 5, Payload::text("готово")))
            .await
            .unwrap();

        assert_eq!(outcome, RelayOutcome::Forwarded {
            slug: "p".into(),
            to: 222,
            role: Role::Executor,
        });
        assert_eq!(out.sent(), vec![Sent::Text(
            222,
            "🧑‍🎨 Команда: готово".into()
        )]);
    }

    #[tokio::test]
    async fn customer_media_reaches_executor() {
        let out = Arc::new(RecordingOutbound::default());
        let relay = relay(bound_store().await, out.clone());

        relay
            .handle(&inbound(
                222,
                6,
                Payload::media(MediaKind::Photo, "ph-1", None),
            ))
            .await
            .unwrap();

        assert_eq!(out.sent(), vec![Sent::Media(
            111,
            MediaKind::Photo,
            "ph-1".into(),
            Some("👤 Клиент: (вложение)".into()),
        )]);
    }

    #[tokio::test]
    async fn inactive_project_never_delivers() {
        let store = bound_store().await;
        store.unlink_chat("p", 12345).await.unwrap();
        let out = Arc::new(RecordingOutbound::default());
        let relay = relay(store, out.clone());

        for chat in [111, 222] {
            let outcome = relay
                .handle(&inbound(chat, 5, Payload::text("hi")))
                .await
                .unwrap();
            assert_eq!(outcome, RelayOutcome::Dropped(DropReason::Inactive));
        }
        assert!(out.sent().is_empty());
    }

    #[tokio::test]
    async fn single_endpoint_never_delivers() {
        let store = Arc::new(MemoryProjectStore::new());
        store.create_project("p", 111).await.unwrap();
        let out = Arc::new(RecordingOutbound::default());
        let relay = relay(store, out.clone());

        let outcome = relay
            .handle(&inbound(111, 5, Payload::text("hi")))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            RelayOutcome::Dropped(DropReason::CounterpartMissing)
        );
        assert!(out.sent().is_empty());
    }

    #[tokio::test]
    async fn unbound_chat_is_dropped() {
        let out = Arc::new(RecordingOutbound::default());
        let relay = relay(bound_store().await, out.clone());
        let outcome = relay
            .handle(&inbound(333, 5, Payload::text("hi")))
            .await
            .unwrap();
        assert_eq!(outcome, RelayOutcome::Dropped(DropReason::Unbound));
    }

    #[tokio::test]
    async fn bot_messages_are_ignored() {
        let out = Arc::new(RecordingOutbound::default());
        let relay = relay(bound_store().await, out.clone());

        let own = inbound(111, 999, Payload::text("echo"));
        assert_eq!(relay.handle(&own).await.unwrap(), RelayOutcome::IgnoredBot);

        let other_bot = InboundMessage {
            author: Some(Author {
                user_id: 42,
                is_bot: true,
            }),
            ..inbound(111, 42, Payload::text("beep"))
        };
        assert_eq!(
            relay.handle(&other_bot).await.unwrap(),
            RelayOutcome::IgnoredBot
        );
        assert!(out.sent().is_empty());
    }

    #[tokio::test]
    async fn anonymous_posts_are_routed() {
        let out = Arc::new(RecordingOutbound::default());
        let relay = relay(bound_store().await, out.clone());
        let msg = InboundMessage {
            chat_id: 222,
            author: None,
            payload: Payload::text("hello"),
        };
        assert!(matches!(
            relay.handle(&msg).await.unwrap(),
            RelayOutcome::Forwarded { to: 111, .. }
        ));
    }

    #[tokio::test]
    async fn delivery_failure_notifies_sender() {
        let out = Arc::new(RecordingOutbound {
            broken: vec![222],
            ..Default::default()
        });
        let relay = relay(bound_store().await, out.clone());

        let outcome = relay
            .handle(&inbound(111, 5, Payload::text("hi")))
            .await
            .unwrap();

        assert_eq!(outcome, RelayOutcome::Failed {
            slug: "p".into(),
            to: 222,
        });
        assert_eq!(out.sent(), vec![Sent::Text(
            111,
            LabelsConfig::default().delivery_failed
        )]);
    }

    #[tokio::test]
    async fn failed_notice_is_swallowed() {
        let out = Arc::new(RecordingOutbound {
            broken: vec![111, 222],
            ..Default::default()
        });
        let relay = relay(bound_store().await, out.clone());

        let outcome = relay
            .handle(&inbound(111, 5, Payload::text("hi")))
            .await
            .unwrap();
        assert!(matches!(outcome, RelayOutcome::Failed { .. }));
        assert!(out.sent().is_empty());
    }
}
