//! Per-user settings and their lazy-load state.

use std::collections::HashMap;

/// Maximum number of characters the store keeps for a setting value.
pub const SETTING_VALUE_MAX_LENGTH: usize = 255;

/// Well-known per-user setting names.
pub mod setting_names {
    /// `"1"` when the user administers the whole site.
    pub const CAN_ADMIN: &str = "canadmin";
    /// Registration time as stored by the registration flow (unix seconds).
    pub const REG_TIMESTAMP: &str = "reg_timestamp";
    /// `"1"` once the user confirmed their email address.
    pub const VERIFIED: &str = "verified";
    /// `"1"` once an administrator approved the account.
    pub const VERIFIED_BY_ADMIN: &str = "verified_by_admin";
    /// Preferred interface language.
    pub const LANGUAGE: &str = "language";
    /// Preferred contact method.
    pub const CONTACT_METHOD: &str = "contactmethod";
    /// `"1"` when the user may appear in "who is online" lists.
    pub const VISIBLE_ONLINE: &str = "visibleonline";
    /// Last session start (unix seconds).
    pub const SESSION_TIME: &str = "sessiontime";

    /// Per-tree setting linking a user to their own individual record.
    pub const GENEALOGY_RECORD: &str = "gedcomid";
}

/// Lazily loaded settings attached to a [`User`](super::User).
///
/// Starts `Unloaded`; the first read replaces it with `Loaded`, which it then
/// stays for the lifetime of the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UserSettings {
    /// Settings have not been read from the store yet.
    #[default]
    Unloaded,
    /// Settings read from the store (possibly empty).
    Loaded(HashMap<String, String>),
}

impl UserSettings {
    /// A loaded, empty settings map.
    #[must_use]
    pub fn empty() -> Self {
        Self::Loaded(HashMap::new())
    }

    /// Returns true once the settings have been read.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// Transitions to `Loaded`. Already loaded settings are left untouched.
    pub fn load(&mut self, values: HashMap<String, String>) {
        if let Self::Unloaded = self {
            *self = Self::Loaded(values);
        }
    }

    /// Returns a loaded value, or `None` when absent or not yet loaded.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        match self {
            Self::Loaded(values) => values.get(name).map(String::as_str),
            Self::Unloaded => None,
        }
    }

    /// Records a value in the loaded map. No effect while unloaded, so a
    /// later load still reads the full set from the store.
    pub fn set(&mut self, name: &str, value: String) {
        if let Self::Loaded(values) = self {
            values.insert(name.to_string(), value);
        }
    }

    /// Removes a value from the loaded map.
    pub fn remove(&mut self, name: &str) {
        if let Self::Loaded(values) = self {
            values.remove(name);
        }
    }
}

/// Truncates a setting value to the store's maximum length, on a character
/// boundary.
#[must_use]
pub fn truncate_setting_value(value: &str) -> &str {
    match value.char_indices().nth(SETTING_VALUE_MAX_LENGTH) {
        Some((index, _)) => &value[..index],
        None => value,
    }
}
