//! SQLite user DAO implementation.

use crate::dao::{UserDao, UserRow};
use crate::DatabasePoolInterface;
use async_trait::async_trait;
use lineage_core::{setting_names, LineageResult, PendingChangePolicy, TreeId, UserId};
use shaku::Component;
use sqlx::SqliteConnection;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Tree settings that hold a user id and must not outlive that user.
const TREE_USER_REFERENCES: [&str; 2] = ["CONTACT_USER_ID", "WEBMASTER_USER_ID"];

/// SQLite user DAO implementation.
#[derive(Component, Clone)]
#[shaku(interface = UserDao)]
pub struct SqliteUserDao {
    #[shaku(inject)]
    pool: Arc<dyn DatabasePoolInterface>,
}

impl SqliteUserDao {
    /// Creates a new SQLite user DAO.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }

    async fn cascade(
        conn: &mut SqliteConnection,
        id: i64,
        policy: PendingChangePolicy,
    ) -> Result<bool, sqlx::Error> {
        // Logs are kept, without an owner
        sqlx::query("UPDATE log SET user_id = NULL WHERE user_id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        sqlx::query("DELETE FROM change WHERE user_id = ? AND status = 'accepted'")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        match policy.new_owner(UserId::new(id)) {
            Some(owner) => {
                sqlx::query("UPDATE change SET user_id = ? WHERE user_id = ?")
                    .bind(owner.into_inner())
                    .bind(id)
                    .execute(&mut *conn)
                    .await?;
            }
            None => {
                sqlx::query("DELETE FROM change WHERE user_id = ?")
                    .bind(id)
                    .execute(&mut *conn)
                    .await?;
            }
        }

        sqlx::query(
            "DELETE FROM block_setting WHERE block_id IN (SELECT block_id FROM block WHERE user_id = ?)",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;

        sqlx::query("DELETE FROM block WHERE user_id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        sqlx::query("DELETE FROM user_gedcom_setting WHERE user_id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        sqlx::query("DELETE FROM gedcom_setting WHERE setting_value = ? AND setting_name IN (?, ?)")
            .bind(id.to_string())
            .bind(TREE_USER_REFERENCES[0])
            .bind(TREE_USER_REFERENCES[1])
            .execute(&mut *conn)
            .await?;

        sqlx::query("DELETE FROM user_setting WHERE user_id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        sqlx::query("DELETE FROM message WHERE user_id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        let result = sqlx::query("DELETE FROM user WHERE user_id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserDao for SqliteUserDao {
    async fn find_row(&self, id: UserId) -> LineageResult<Option<UserRow>> {
        debug!("Finding user row by id: {}", id);

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT user_id, user_name AS username, real_name AS display_name, email
            FROM user
            WHERE user_id = ?
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(row)
    }

    async fn find_id_by_identifier(&self, identifier: &str) -> LineageResult<Option<UserId>> {
        let id: Option<i64> = sqlx::query_scalar("SELECT user_id FROM user WHERE ? IN (user_name, email)")
            .bind(identifier)
            .fetch_optional(self.pool.inner())
            .await?;

        Ok(id.map(UserId::new))
    }

    async fn find_id_by_username(&self, username: &str) -> LineageResult<Option<UserId>> {
        let id: Option<i64> = sqlx::query_scalar("SELECT user_id FROM user WHERE user_name = ?")
            .bind(username)
            .fetch_optional(self.pool.inner())
            .await?;

        Ok(id.map(UserId::new))
    }

    async fn find_id_by_email(&self, email: &str) -> LineageResult<Option<UserId>> {
        let id: Option<i64> = sqlx::query_scalar("SELECT user_id FROM user WHERE email = ?")
            .bind(email)
            .fetch_optional(self.pool.inner())
            .await?;

        Ok(id.map(UserId::new))
    }

    async fn find_id_by_genealogy_record(&self, tree_id: TreeId, xref: &str) -> LineageResult<Option<UserId>> {
        let id: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT user_id
            FROM user_gedcom_setting
            WHERE gedcom_id = ? AND setting_name = ? AND setting_value = ?
            LIMIT 1
            "#,
        )
        .bind(tree_id.into_inner())
        .bind(setting_names::GENEALOGY_RECORD)
        .bind(xref)
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(id.map(UserId::new))
    }

    async fn find_id_latest_registration(&self) -> LineageResult<Option<UserId>> {
        // Plain string ordering, as the values are stored
        let id: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT u.user_id
            FROM user u
            JOIN user_setting us ON us.user_id = u.user_id AND us.setting_name = ?
            WHERE u.user_id > 0
            ORDER BY us.setting_value DESC
            LIMIT 1
            "#,
        )
        .bind(setting_names::REG_TIMESTAMP)
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(id.map(UserId::new))
    }

    async fn insert(
        &self,
        username: &str,
        display_name: &str,
        email: &str,
        password_hash: &str,
    ) -> LineageResult<UserId> {
        debug!("Inserting user: {}", username);

        let result = sqlx::query(
            "INSERT INTO user (user_name, real_name, email, password) VALUES (?, ?, ?, ?)",
        )
        .bind(username)
        .bind(display_name)
        .bind(email)
        .bind(password_hash)
        .execute(self.pool.inner())
        .await?;

        Ok(UserId::new(result.last_insert_rowid()))
    }

    async fn count_real(&self) -> LineageResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user WHERE user_id > 0")
            .fetch_one(self.pool.inner())
            .await?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn list_all(&self) -> LineageResult<Vec<UserRow>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT user_id, user_name AS username, real_name AS display_name, email
            FROM user
            WHERE user_id > 0
            ORDER BY user_name
            "#,
        )
        .fetch_all(self.pool.inner())
        .await?;

        Ok(rows)
    }

    async fn list_with_setting(&self, name: &str, value: &str) -> LineageResult<Vec<UserRow>> {
        debug!("Listing users with setting {} = {}", name, value);

        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.user_id, u.user_name AS username, u.real_name AS display_name, u.email
            FROM user u
            JOIN user_setting us ON us.user_id = u.user_id
            WHERE u.user_id > 0 AND us.setting_name = ? AND us.setting_value = ?
            ORDER BY u.user_name
            "#,
        )
        .bind(name)
        .bind(value)
        .fetch_all(self.pool.inner())
        .await?;

        Ok(rows)
    }

    async fn list_without_setting(&self, name: &str, value: &str) -> LineageResult<Vec<UserRow>> {
        debug!("Listing users without setting {} = {}", name, value);

        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.user_id, u.user_name AS username, u.real_name AS display_name, u.email
            FROM user u
            LEFT JOIN user_setting us ON us.user_id = u.user_id AND us.setting_name = ?
            WHERE u.user_id > 0 AND (us.setting_value IS NULL OR us.setting_value <> ?)
            ORDER BY u.user_name
            "#,
        )
        .bind(name)
        .bind(value)
        .fetch_all(self.pool.inner())
        .await?;

        Ok(rows)
    }

    async fn list_logged_in(&self) -> LineageResult<Vec<UserRow>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT DISTINCT u.user_id, u.user_name AS username, u.real_name AS display_name, u.email
            FROM user u
            JOIN session s ON s.user_id = u.user_id
            WHERE u.user_id > 0
            ORDER BY u.user_name
            "#,
        )
        .fetch_all(self.pool.inner())
        .await?;

        Ok(rows)
    }

    async fn password_hash(&self, id: UserId) -> LineageResult<Option<String>> {
        let hash: Option<String> = sqlx::query_scalar("SELECT password FROM user WHERE user_id = ?")
            .bind(id.into_inner())
            .fetch_optional(self.pool.inner())
            .await?;

        Ok(hash)
    }

    async fn update_username(&self, id: UserId, username: &str) -> LineageResult<()> {
        sqlx::query("UPDATE user SET user_name = ? WHERE user_id = ?")
            .bind(username)
            .bind(id.into_inner())
            .execute(self.pool.inner())
            .await?;

        Ok(())
    }

    async fn update_display_name(&self, id: UserId, display_name: &str) -> LineageResult<()> {
        sqlx::query("UPDATE user SET real_name = ? WHERE user_id = ?")
            .bind(display_name)
            .bind(id.into_inner())
            .execute(self.pool.inner())
            .await?;

        Ok(())
    }

    async fn update_email(&self, id: UserId, email: &str) -> LineageResult<()> {
        sqlx::query("UPDATE user SET email = ? WHERE user_id = ?")
            .bind(email)
            .bind(id.into_inner())
            .execute(self.pool.inner())
            .await?;

        Ok(())
    }

    async fn update_password_hash(&self, id: UserId, password_hash: &str) -> LineageResult<()> {
        sqlx::query("UPDATE user SET password = ? WHERE user_id = ?")
            .bind(password_hash)
            .bind(id.into_inner())
            .execute(self.pool.inner())
            .await?;

        Ok(())
    }

    async fn load_settings(&self, id: UserId) -> LineageResult<HashMap<String, String>> {
        debug!("Loading settings for user: {}", id);

        let rows = sqlx::query_as::<_, (String, String)>(
            "SELECT setting_name, setting_value FROM user_setting WHERE user_id = ?",
        )
        .bind(id.into_inner())
        .fetch_all(self.pool.inner())
        .await?;

        Ok(rows.into_iter().collect())
    }

    async fn upsert_setting(&self, id: UserId, name: &str, value: &str) -> LineageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_setting (user_id, setting_name, setting_value)
            VALUES (?, ?, ?)
            ON CONFLICT (user_id, setting_name) DO UPDATE SET setting_value = excluded.setting_value
            "#,
        )
        .bind(id.into_inner())
        .bind(name)
        .bind(value)
        .execute(self.pool.inner())
        .await?;

        Ok(())
    }

    async fn delete_setting(&self, id: UserId, name: &str) -> LineageResult<()> {
        sqlx::query("DELETE FROM user_setting WHERE user_id = ? AND setting_name = ?")
            .bind(id.into_inner())
            .bind(name)
            .execute(self.pool.inner())
            .await?;

        Ok(())
    }

    async fn delete_cascade(&self, id: UserId, policy: PendingChangePolicy) -> LineageResult<bool> {
        debug!("Deleting user {} with pending change policy {}", id, policy);

        let mut tx = self.pool.inner().begin().await?;

        match Self::cascade(&mut tx, id.into_inner(), policy).await {
            Ok(deleted) => {
                tx.commit().await?;
                Ok(deleted)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!("Rollback of user deletion failed: {}", rollback_err);
                }
                Err(e.into())
            }
        }
    }
}

impl std::fmt::Debug for SqliteUserDao {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteUserDao").finish_non_exhaustive()
    }
}
