//! Shared types and error helpers used across all relay crates.

pub mod error;
pub mod types;

pub use {
    error::FromMessage,
    types::{ChatId, Role, UserId},
};
