use {
    relay_common::{ChatId, UserId},
    serde::{Deserialize, Serialize},
};

/// Attachment kinds the relay re-sends as the same media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Photo,
    Document,
    Voice,
    Audio,
    Video,
}

impl MediaKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Document => "document",
            Self::Voice => "voice",
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }
}

/// Content of an inbound message, decided once at the transport boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    /// Plain text with no attachment.
    Text { text: String },
    /// A supported attachment, referenced by its platform file id.
    Media {
        media: MediaKind,
        file_id: String,
        caption: Option<String>,
    },
    /// Anything else (stickers, polls, locations, ...).
    Unknown {
        text: Option<String>,
        caption: Option<String>,
    },
}

impl Payload {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn media(media: MediaKind, file_id: impl Into<String>, caption: Option<String>) -> Self {
        Self::Media {
            media,
            file_id: file_id.into(),
            caption,
        }
    }

    /// Short name for logs.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Media { media, .. } => media.as_str(),
            Self::Unknown { .. } => "unknown",
        }
    }
}

/// Who wrote an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub user_id: UserId,
    pub is_bot: bool,
}

/// An inbound message as seen by the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub chat_id: ChatId,
    /// `None` for anonymous channel posts.
    pub author: Option<Author>,
    pub payload: Payload,
}
