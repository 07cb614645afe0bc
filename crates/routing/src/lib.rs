//! Decide where an inbound message goes and what the copy looks like.
//!
//! Routing cascade:
//! 1. No project bound to the source chat, or project inactive: drop
//! 2. Source is the executor and a customer is bound: forward to customer
//! 3. Source is the customer and an executor is bound: forward to executor
//! 4. Counterpart unbound: drop
//!
//! [`resolve_route`] and [`plan_forward`] are pure; [`Relay`] glues them to
//! a [`ProjectStore`](relay_projects::ProjectStore) and a
//! [`RelayOutbound`](relay_channels::RelayOutbound).

pub mod error;
pub mod plan;
pub mod relay;
pub mod resolve;

pub use {
    error::{Error, Result},
    plan::{MAX_CAPTION_LEN, MAX_TEXT_LEN, Outgoing, plan_forward, prefix_for},
    relay::{Relay, RelayOutcome},
    resolve::{DropReason, Route, resolve_route},
};
