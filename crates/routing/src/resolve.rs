use {
    relay_common::{ChatId, Role},
    relay_projects::Project,
};

/// Why a message was not forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// No project lists the source chat as an endpoint.
    Unbound,
    Inactive,
    /// The source is bound but the other side is not.
    CounterpartMissing,
}

impl DropReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unbound => "unbound",
            Self::Inactive => "inactive",
            Self::CounterpartMissing => "counterpart_missing",
        }
    }
}

/// Outcome of route resolution for one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Deliver to `to`, labelled with the sender's `role`.
    Forward { to: ChatId, role: Role },
    Drop(DropReason),
}

/// Resolve the destination for a message from `source`, given the project
/// (if any) that lists `source` as an endpoint.
///
/// The executor branch is checked first, so a chat bound on both sides of
/// the same project is treated as the executor.
#[must_use]
pub fn resolve_route(project: Option<&Project>, source: ChatId) -> Route {
    let Some(project) = project else {
        return Route::Drop(DropReason::Unbound);
    };
    if !project.is_active {
        return Route::Drop(DropReason::Inactive);
    }

    let Some(role) = project.role_of(source) else {
        return Route::Drop(DropReason::Unbound);
    };
    match project.endpoint(role.counterpart()) {
        Some(to) => Route::Forward { to, role },
        None => Route::Drop(DropReason::CounterpartMissing),
    }
}
