//! Repository trait definitions.

use lineage_core::{Interface, LineageResult, PasswordCheck, TreeId, User, UserId};
use async_trait::async_trait;

/// User repository trait.
///
/// Lookups by id go through a per-repository cache; every other lookup
/// resolves an id first and then reuses it. Write operations take the
/// caller's `User` by mutable reference and update it in place.
#[async_trait]
pub trait UserRepository: Interface + Send + Sync {
    /// Finds a user by ID.
    async fn find_by_id(&self, id: UserId) -> LineageResult<Option<User>>;

    /// Finds a user by username or email.
    async fn find_by_identifier(&self, identifier: &str) -> LineageResult<Option<User>>;

    /// Finds a user by username.
    async fn find_by_username(&self, username: &str) -> LineageResult<Option<User>>;

    /// Finds a user by email.
    async fn find_by_email(&self, email: &str) -> LineageResult<Option<User>>;

    /// Finds the user linked to individual `xref` in a tree.
    async fn find_by_genealogy_record(&self, tree_id: TreeId, xref: &str) -> LineageResult<Option<User>>;

    /// Finds the most recently registered user.
    async fn find_latest_to_register(&self) -> LineageResult<Option<User>>;

    /// Creates a user, hashing `password`, and returns the stored user.
    ///
    /// The stored user is re-read by identifier. Fails with
    /// `LineageError::Internal` when `username` resolves to a different
    /// account, which happens when it equals another user's email.
    async fn create(
        &self,
        username: &str,
        display_name: &str,
        email: &str,
        password: &str,
    ) -> LineageResult<User>;

    /// Counts real users.
    async fn count(&self) -> LineageResult<u64>;

    /// Lists real users ordered by username.
    async fn list_all(&self) -> LineageResult<Vec<User>>;

    /// Lists site administrators.
    async fn list_admins(&self) -> LineageResult<Vec<User>>;

    /// Lists users that currently hold a session.
    async fn list_logged_in(&self) -> LineageResult<Vec<User>>;

    /// Lists users not yet approved by an administrator.
    async fn list_unapproved(&self) -> LineageResult<Vec<User>>;

    /// Lists users that have not confirmed their email address.
    async fn list_unverified(&self) -> LineageResult<Vec<User>>;

    /// Checks a password, upgrading the stored hash when it is outdated.
    async fn check_password(&self, user: &User, password: &str) -> LineageResult<PasswordCheck>;

    /// Changes the username.
    async fn set_username<'a>(&self, user: &'a mut User, username: &str) -> LineageResult<&'a mut User>;

    /// Changes the display name.
    async fn set_display_name<'a>(
        &self,
        user: &'a mut User,
        display_name: &str,
    ) -> LineageResult<&'a mut User>;

    /// Changes the email address.
    async fn set_email<'a>(&self, user: &'a mut User, email: &str) -> LineageResult<&'a mut User>;

    /// Replaces the password.
    async fn set_password<'a>(&self, user: &'a mut User, password: &str) -> LineageResult<&'a mut User>;

    /// Reads a setting, loading the user's settings on first use.
    async fn get_setting(&self, user: &mut User, name: &str) -> LineageResult<Option<String>>;

    /// Reads a setting, falling back to `default` when absent.
    async fn get_setting_or(&self, user: &mut User, name: &str, default: &str) -> LineageResult<String> {
        Ok(self
            .get_setting(user, name)
            .await?
            .unwrap_or_else(|| default.to_string()))
    }

    /// Writes a setting; `None` deletes it.
    async fn set_setting(&self, user: &mut User, name: &str, value: Option<&str>) -> LineageResult<()>;

    /// Deletes a user together with the rows that reference it.
    ///
    /// Returns `true` if the user existed.
    async fn delete(&self, user: &User) -> LineageResult<bool>;

    /// Forgets the cached lookup for `id`.
    fn evict(&self, id: UserId);

    /// Forgets every cached lookup.
    fn clear_cache(&self);
}
