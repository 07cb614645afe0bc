use std::fmt;

use serde::{Deserialize, Serialize};

/// Platform chat identifier (Telegram chat ids are signed 64-bit).
pub type ChatId = i64;

/// Platform user identifier of a message author.
pub type UserId = u64;

/// Which side of a project a chat belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Executor,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Executor => "executor",
        }
    }

    /// The opposite endpoint of a project.
    #[must_use]
    pub fn counterpart(self) -> Self {
        match self {
            Self::Customer => Self::Executor,
            Self::Executor => Self::Customer,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_displays_as_str() {
        assert_eq!(Role::Executor.to_string(), "executor");
        assert_eq!(Role::Customer.as_str(), "customer");
    }

    #[test]
    fn counterpart_flips() {
        assert_eq!(Role::Customer.counterpart(), Role::Executor);
        assert_eq!(Role::Executor.counterpart(), Role::Customer);
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Role::Executor).unwrap();
        assert_eq!(json, "\"executor\"");
    }
}
