use std::error::Error as StdError;

/// Crate-wide result type for transport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed transport errors shared across outbound implementations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The platform rejected or never received the message.
    #[error("transport failure: {context}: {source}")]
    TransportFailure {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn transport(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::TransportFailure {
            context: context.into(),
            source: Box::new(source),
        }
    }
}
