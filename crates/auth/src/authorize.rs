use rentaldesk_core::UserId;

use crate::IdentityClaim;

/// Operation being attempted against an owned resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Update,
    Delete,
}

impl Operation {
    pub fn is_read(&self) -> bool {
        matches!(self, Operation::List | Operation::Get)
    }
}

/// Why an operation was allowed (kept for audit logging).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowReason {
    PublicRead,
    Owner,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow(AllowReason),
    Deny,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow(_))
    }
}

/// Decide whether `claim` may perform `operation` on a resource owned by
/// `resource_owner_id`.
///
/// - No IO
/// - No panics
/// - Reads are public; writes need the owner or an admin.
pub fn authorize(claim: Option<&IdentityClaim>, resource_owner_id: &UserId, operation: Operation) -> Decision {
    if operation.is_read() {
        return Decision::Allow(AllowReason::PublicRead);
    }

    match claim {
        Some(c) if c.role.is_admin() => Decision::Allow(AllowReason::Admin),
        Some(c) if &c.subject_id == resource_owner_id => Decision::Allow(AllowReason::Owner),
        _ => Decision::Deny,
    }
}
