//! Transport-facing types for the relay.
//!
//! Inbound messages are classified once at the transport boundary into a
//! [`Payload`], and forwarded copies leave through a [`RelayOutbound`]
//! implementation. Nothing here knows about a concrete chat platform.

pub mod error;
pub mod payload;
pub mod plugin;

pub use {
    error::{Error, Result},
    payload::{Author, InboundMessage, MediaKind, Payload},
    plugin::RelayOutbound,
};
