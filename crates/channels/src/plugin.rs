use {async_trait::async_trait, relay_common::ChatId};

use crate::{MediaKind, Result};

/// Send relayed copies to a chat.
///
/// Implementations report delivery problems as
/// [`Error::TransportFailure`](crate::Error::TransportFailure); callers decide
/// whether to tell the sender.
#[async_trait]
pub trait RelayOutbound: Send + Sync {
    async fn send_text(&self, to: ChatId, text: &str) -> Result<()>;

    /// Re-send an attachment by file id with an optional caption.
    async fn send_media(
        &self,
        to: ChatId,
        media: MediaKind,
        file_id: &str,
        caption: Option<&str>,
    ) -> Result<()>;
}
