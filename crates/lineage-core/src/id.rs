//! Typed ID wrappers for stored rows.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// A strongly-typed wrapper for user IDs.
///
/// Ids are assigned by the store. `0` is the anonymous sentinel and any
/// non-positive id denotes a pseudo-user (the store keeps a `-1` row to
/// hold default settings); neither is a real account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    /// The "no authenticated user" sentinel.
    pub const ANONYMOUS: Self = Self(0);

    /// Creates a user ID from a raw store value.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns true for ids that identify a real stored account.
    #[must_use]
    pub const fn is_real(self) -> bool {
        self.0 > 0
    }

    /// Returns the raw store value.
    #[must_use]
    pub const fn into_inner(self) -> i64 {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::ANONYMOUS
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<UserId> for i64 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

/// A strongly-typed wrapper for family tree (GEDCOM file) IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreeId(pub i64);

impl TreeId {
    /// Creates a tree ID from a raw store value.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw store value.
    #[must_use]
    pub const fn into_inner(self) -> i64 {
        self.0
    }
}

impl Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
