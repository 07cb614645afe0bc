use {
    relay_common::{ChatId, Role},
    serde::{Deserialize, Serialize},
};

/// A named binding between a customer chat and an executor chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub slug: String,
    pub customer_chat_id: Option<ChatId>,
    pub executor_chat_id: Option<ChatId>,
    pub is_active: bool,
}

/// Which branch an unlink took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlinkOutcome {
    ExecutorCleared,
    CustomerCleared,
    /// The chat matched neither endpoint; the project was deactivated.
    Deactivated,
}

impl Project {
    /// A freshly created project: executor bound, customer unset, active.
    pub fn new(slug: impl Into<String>, executor_chat_id: ChatId) -> Self {
        Self {
            slug: slug.into(),
            customer_chat_id: None,
            executor_chat_id: Some(executor_chat_id),
            is_active: true,
        }
    }

    /// Endpoint bound for `role`, if any.
    #[must_use]
    pub fn endpoint(&self, role: Role) -> Option<ChatId> {
        match role {
            Role::Customer => self.customer_chat_id,
            Role::Executor => self.executor_chat_id,
        }
    }

    /// Role `chat_id` plays in this project. Executor wins when both
    /// endpoints carry the same id.
    #[must_use]
    pub fn role_of(&self, chat_id: ChatId) -> Option<Role> {
        if self.executor_chat_id == Some(chat_id) {
            Some(Role::Executor)
        } else if self.customer_chat_id == Some(chat_id) {
            Some(Role::Customer)
        } else {
            None
        }
    }

    /// Overwrite the customer endpoint and reactivate. Last bind wins.
    pub fn bind_customer(&mut self, customer_chat_id: ChatId) {
        self.customer_chat_id = Some(customer_chat_id);
        self.is_active = true;
    }

    /// Remove `chat_id` from whichever endpoint holds it.
    ///
    /// Exactly one branch applies. A chat that is neither endpoint leaves both
    /// fields alone and deactivates the project.
    pub fn unlink(&mut self, chat_id: ChatId) -> UnlinkOutcome {
        match self.role_of(chat_id) {
            Some(Role::Executor) => {
                self.executor_chat_id = None;
                self.is_active = true;
                UnlinkOutcome::ExecutorCleared
            },
            Some(Role::Customer) => {
                self.customer_chat_id = None;
                self.is_active = true;
                UnlinkOutcome::CustomerCleared
            },
            None => {
                self.is_active = false;
                UnlinkOutcome::Deactivated
            },
        }
    }
}
