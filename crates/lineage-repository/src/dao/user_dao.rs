//! UserDao trait: the statement-level access the repository is built on.
//!
//! Each method runs a single parameterised statement against the store,
//! except [`UserDao::delete_cascade`], which runs the whole deletion
//! cascade inside one transaction. Implementations do no caching and no
//! hashing; that is the job of [`UserRepository`].
//!
//! [`UserRepository`]: crate::traits::UserRepository

use async_trait::async_trait;
use lineage_core::{Interface, LineageResult, PendingChangePolicy, TreeId, User, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;

/// Identity columns of a `user` row.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct UserRow {
    pub user_id: i64,
    pub username: String,
    pub display_name: String,
    pub email: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User::new(UserId::new(row.user_id), row.username, row.display_name, row.email)
    }
}

/// Low-level user data access object.
#[async_trait]
pub trait UserDao: Interface + Send + Sync {
    /// Reads one user row by primary key.
    async fn find_row(&self, id: UserId) -> LineageResult<Option<UserRow>>;

    /// Resolves the id of the user whose username or email equals `identifier`.
    async fn find_id_by_identifier(&self, identifier: &str) -> LineageResult<Option<UserId>>;

    /// Resolves a user id by username.
    async fn find_id_by_username(&self, username: &str) -> LineageResult<Option<UserId>>;

    /// Resolves a user id by email.
    async fn find_id_by_email(&self, email: &str) -> LineageResult<Option<UserId>>;

    /// Resolves the user linked to individual `xref` in tree `tree_id`.
    async fn find_id_by_genealogy_record(&self, tree_id: TreeId, xref: &str) -> LineageResult<Option<UserId>>;

    /// Resolves the real user with the greatest registration timestamp setting.
    async fn find_id_latest_registration(&self) -> LineageResult<Option<UserId>>;

    /// Inserts a user row and returns the generated id.
    async fn insert(
        &self,
        username: &str,
        display_name: &str,
        email: &str,
        password_hash: &str,
    ) -> LineageResult<UserId>;

    /// Counts users with a positive id.
    async fn count_real(&self) -> LineageResult<u64>;

    /// Lists users with a positive id, ordered by username.
    async fn list_all(&self) -> LineageResult<Vec<UserRow>>;

    /// Lists real users whose setting `name` equals `value`.
    async fn list_with_setting(&self, name: &str, value: &str) -> LineageResult<Vec<UserRow>>;

    /// Lists real users whose setting `name` is absent or differs from `value`.
    async fn list_without_setting(&self, name: &str, value: &str) -> LineageResult<Vec<UserRow>>;

    /// Lists distinct real users that own at least one session.
    async fn list_logged_in(&self) -> LineageResult<Vec<UserRow>>;

    /// Reads the stored password hash.
    async fn password_hash(&self, id: UserId) -> LineageResult<Option<String>>;

    /// Writes the username column.
    async fn update_username(&self, id: UserId, username: &str) -> LineageResult<()>;

    /// Writes the display name column.
    async fn update_display_name(&self, id: UserId, display_name: &str) -> LineageResult<()>;

    /// Writes the email column.
    async fn update_email(&self, id: UserId, email: &str) -> LineageResult<()>;

    /// Writes the password hash column.
    async fn update_password_hash(&self, id: UserId, password_hash: &str) -> LineageResult<()>;

    /// Reads every setting of a user as a name → value map.
    async fn load_settings(&self, id: UserId) -> LineageResult<HashMap<String, String>>;

    /// Inserts or replaces one setting.
    async fn upsert_setting(&self, id: UserId, name: &str, value: &str) -> LineageResult<()>;

    /// Deletes one setting.
    async fn delete_setting(&self, id: UserId, name: &str) -> LineageResult<()>;

    /// Deletes a user and clears or reassigns every dependent row, atomically.
    ///
    /// Returns `true` if the user row existed.
    async fn delete_cascade(&self, id: UserId, policy: PendingChangePolicy) -> LineageResult<bool>;
}
