//! User entity.

use super::user_settings::UserSettings;
use crate::UserId;
use serde::{Deserialize, Serialize};

/// A user account: identity and profile fields plus lazily loaded settings.
///
/// The password hash is not held here; it is only read by the
/// repository while checking a password.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identifier.
    pub id: UserId,

    /// Unique, case-sensitive login handle.
    pub username: String,

    /// Name shown to other users.
    pub display_name: String,

    /// Unique email address.
    pub email: String,

    /// Settings cache for this instance.
    #[serde(skip)]
    pub settings: UserSettings,
}

impl User {
    /// Creates a user from stored identity fields. Settings start unloaded.
    #[must_use]
    pub fn new(id: UserId, username: String, display_name: String, email: String) -> Self {
        Self {
            id,
            username,
            display_name,
            email,
            settings: UserSettings::Unloaded,
        }
    }

    /// Creates the anonymous visitor. Its settings are already loaded
    /// (and empty) so they are never fetched from the store.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            id: UserId::ANONYMOUS,
            username: String::new(),
            display_name: String::new(),
            email: String::new(),
            settings: UserSettings::empty(),
        }
    }

    /// Checks if this is the anonymous visitor (id 0). Other non-positive
    /// ids, such as the `-1` default-settings row, are stored users.
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        self.id.0 == UserId::ANONYMOUS.0
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.username == other.username
            && self.display_name == other.display_name
            && self.email == other.email
    }
}

impl Eq for User {}
