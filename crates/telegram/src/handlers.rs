use std::sync::Arc;

use {
    relay_channels::{Author, InboundMessage, MediaKind as RelayMediaKind, Payload},
    relay_config::LabelsConfig,
    relay_projects::ProjectStore,
    relay_routing::{Relay, RelayOutcome},
    teloxide::types::{MediaKind, Message, MessageKind},
    tracing::{debug, warn},
};

use crate::{
    Result,
    access::AdminGate,
    commands::{Command, Commands},
    outbound::TelegramOutbound,
};

/// Who the bot is, as reported by `getMe`.
#[derive(Debug, Clone)]
pub struct BotIdentity {
    pub user_id: u64,
    pub username: Option<String>,
}

/// Handles one inbound Telegram message: answers commands, relays the rest.
pub struct UpdateHandler {
    identity: BotIdentity,
    outbound: Arc<TelegramOutbound>,
    commands: Commands,
    relay: Relay,
}

impl UpdateHandler {
    pub fn new(
        identity: BotIdentity,
        outbound: Arc<TelegramOutbound>,
        store: Arc<dyn ProjectStore>,
        gate: AdminGate,
        labels: LabelsConfig,
    ) -> Self {
        let relay = Relay::new(Arc::clone(&store), outbound.clone(), labels)
            .with_bot_user_id(identity.user_id);
        Self {
            commands: Commands::new(store, gate),
            identity,
            outbound,
            relay,
        }
    }

    pub async fn handle_message(&self, msg: &Message) -> Result<Option<RelayOutcome>> {
        let chat_id = msg.chat.id.0;
        // Anonymous group admins post as a bot account, so commands are
        // answered before the bot filter; the admin gate still refuses them.
        if let Some(cmd) = extract_command(msg, self.identity.username.as_deref()) {
            self.handle_command(msg, &cmd).await;
            return Ok(None);
        }

        if msg.from.as_ref().is_some_and(|u| u.is_bot) {
            debug!(chat_id, "ignoring message from bot account");
            return Ok(None);
        }

        let Some(inbound) = extract_inbound(msg) else {
            debug!(chat_id, "ignoring service message");
            return Ok(None);
        };
        let outcome = self.relay.handle(&inbound).await?;
        Ok(Some(outcome))
    }

    async fn handle_command(&self, msg: &Message, cmd: &Command) {
        let chat_id = msg.chat.id.0;
        let user_id = msg.from.as_ref().map(|u| u.id.0);
        debug!(
            chat_id,
            ?user_id,
            command = cmd.name(),
            privileged = cmd.is_privileged(),
            "handling command"
        );

        let Some(reply) = self.commands.execute(cmd, chat_id, user_id).await else {
            debug!(chat_id, command = cmd.name(), "ignoring unknown command");
            return;
        };
        if let Err(e) = self.outbound.reply(chat_id, msg.id, &reply).await {
            warn!(chat_id, command = cmd.name(), error = %e, "failed to send command response");
        }
    }
}

/// The command carried by a text message, if it is one.
fn extract_command(msg: &Message, bot_username: Option<&str>) -> Option<Command> {
    match &msg.kind {
        MessageKind::Common(common) => match &common.media_kind {
            MediaKind::Text(t) => Command::parse(&t.text, bot_username),
            _ => None,
        },
        _ => None,
    }
}

/// Classify a Telegram message into the relay's [`Payload`].
///
/// Returns `None` for service messages (joins, pins, title changes, ...),
/// which are never relayed.
pub fn extract_inbound(msg: &Message) -> Option<InboundMessage> {
    let MessageKind::Common(common) = &msg.kind else {
        return None;
    };

    let payload = match &common.media_kind {
        MediaKind::Text(t) => Payload::text(t.text.clone()),
        // Largest size is last.
        MediaKind::Photo(p) => {
            let photo = p.photo.last()?;
            Payload::media(RelayMediaKind::Photo, photo.file.id.clone(), p.caption.clone())
        },
        MediaKind::Document(d) => Payload::media(
            RelayMediaKind::Document,
            d.document.file.id.clone(),
            d.caption.clone(),
        ),
        MediaKind::Voice(v) => Payload::media(
            RelayMediaKind::Voice,
            v.voice.file.id.clone(),
            v.caption.clone(),
        ),
        MediaKind::Audio(a) => Payload::media(
            RelayMediaKind::Audio,
            a.audio.file.id.clone(),
            a.caption.clone(),
        ),
        MediaKind::Video(v) => Payload::media(
            RelayMediaKind::Video,
            v.video.file.id.clone(),
            v.caption.clone(),
        ),
        MediaKind::Animation(a) => Payload::Unknown {
            text: None,
            caption: a.caption.clone(),
        },
        _ => Payload::Unknown {
            text: None,
            caption: None,
        },
    };

    Some(InboundMessage {
        chat_id: msg.chat.id.0,
        author: msg.from.as_ref().map(|u| Author {
            user_id: u.id.0,
            is_bot: u.is_bot,
        }),
        payload,
    })
}
