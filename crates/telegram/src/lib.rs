//! Telegram transport for the relay.
//!
//! Long-polls the Bot API with teloxide, fans updates out to per-chat
//! queues, answers admin commands, and relays everything else through
//! [`relay_routing::Relay`].

pub mod access;
pub mod bot;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod outbound;
pub mod queue;
pub mod strings;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod test_support;

pub use {
    access::AdminGate,
    bot::RelayBot,
    error::{Error, Result},
    outbound::TelegramOutbound,
};
