//! Outcome of a password check.

use serde::{Deserialize, Serialize};

/// Result of checking a password against the stored hash.
///
/// A successful check may upgrade the stored hash to the current hashing
/// parameters; `AcceptedAndRehashed` reports that the store was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PasswordCheck {
    /// Wrong password, unknown user, or no usable stored hash.
    Rejected,
    /// Password matched; stored hash left as is.
    Accepted,
    /// Password matched and the stored hash was replaced.
    AcceptedAndRehashed,
}

impl PasswordCheck {
    /// Returns true if the password matched.
    #[must_use]
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted | Self::AcceptedAndRehashed)
    }

    /// Returns true if the check wrote a new hash to the store.
    #[must_use]
    pub const fn rehashed(self) -> bool {
        matches!(self, Self::AcceptedAndRehashed)
    }
}

impl From<PasswordCheck> for bool {
    fn from(check: PasswordCheck) -> Self {
        check.is_accepted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acceptance() {
        assert!(!PasswordCheck::Rejected.is_accepted());
        assert!(PasswordCheck::Accepted.is_accepted());
        assert!(PasswordCheck::AcceptedAndRehashed.is_accepted());
        assert!(PasswordCheck::AcceptedAndRehashed.rehashed());
        assert!(!PasswordCheck::Accepted.rehashed());
        assert!(bool::from(PasswordCheck::Accepted));
    }
}
