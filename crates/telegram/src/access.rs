use std::{collections::HashSet, future::Future};

use {relay_common::UserId, tracing::warn};

use crate::strings;

/// Capability check for privileged commands.
///
/// A user is an admin when their id is in the configured set. Messages
/// without an author (anonymous channel posts) are never admin.
#[derive(Debug, Clone, Default)]
pub struct AdminGate {
    admins: HashSet<UserId>,
}

impl AdminGate {
    pub fn new(admins: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            admins: admins.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn is_admin(&self, user_id: Option<UserId>) -> bool {
        user_id.is_some_and(|id| self.admins.contains(&id))
    }

    /// Run `handler` only for admins; everyone else gets the refusal reply.
    pub async fn guard<F, Fut>(&self, user_id: Option<UserId>, command: &str, handler: F) -> String
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = String>,
    {
        if self.is_admin(user_id) {
            handler().await
        } else {
            warn!(?user_id, command, "access denied: admin command");
            strings::ADMIN_ONLY.to_string()
        }
    }
}
