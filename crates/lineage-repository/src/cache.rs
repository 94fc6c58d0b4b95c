//! Id-keyed user cache.
//!
//! Remembers the outcome of every id lookup, including misses, for the
//! lifetime of the owning repository. Entries hold identity fields only:
//! settings belong to the instance handed to the caller.

use lineage_core::{User, UserId, UserSettings};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

/// Cache of id lookups. `Some(None)` from [`UserCache::get`] is a
/// remembered miss.
#[derive(Debug, Default)]
pub struct UserCache {
    entries: RwLock<HashMap<UserId, Option<User>>>,
}

impl UserCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the remembered outcome for `id`, or `None` if it was never
    /// looked up.
    #[must_use]
    pub fn get(&self, id: UserId) -> Option<Option<User>> {
        self.entries.read().get(&id).cloned()
    }

    /// Records the outcome of a lookup.
    pub fn insert(&self, id: UserId, user: Option<User>) {
        let user = user.map(identity_only);
        self.entries.write().insert(id, user);
    }

    /// Records a user that is known to exist.
    pub fn store(&self, user: &User) {
        self.insert(user.id, Some(user.clone()));
    }

    /// Forgets the outcome for `id`.
    pub fn evict(&self, id: UserId) {
        if self.entries.write().remove(&id).is_some() {
            debug!("Evicted user {} from cache", id);
        }
    }

    /// Forgets every outcome.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Number of remembered outcomes, misses included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

fn identity_only(mut user: User) -> User {
    user.settings = UserSettings::Unloaded;
    user
}
