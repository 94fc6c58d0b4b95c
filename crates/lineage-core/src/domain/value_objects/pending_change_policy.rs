//! What happens to a deleted user's unaccepted pending changes.

use crate::UserId;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Policy applied to a user's non-accepted pending changes when the user
/// is deleted. Accepted changes are always removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "owner")]
pub enum PendingChangePolicy {
    /// Reassign the changes to the deleted user's own id. The rows keep a
    /// dangling owner id once the user row is gone.
    #[default]
    Retain,
    /// Hand the changes over to another account (e.g. a moderator or a
    /// system placeholder).
    ReassignTo(UserId),
    /// Drop the changes together with the user.
    Delete,
}

impl PendingChangePolicy {
    /// Returns the owner that pending changes of `deleted` end up with,
    /// or `None` when they are deleted.
    #[must_use]
    pub const fn new_owner(self, deleted: UserId) -> Option<UserId> {
        match self {
            Self::Retain => Some(deleted),
            Self::ReassignTo(owner) => Some(owner),
            Self::Delete => None,
        }
    }
}

impl Display for PendingChangePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Retain => write!(f, "retain"),
            Self::ReassignTo(owner) => write!(f, "reassign_to({owner})"),
            Self::Delete => write!(f, "delete"),
        }
    }
}
