//! `UserRepositoryImpl`: repository layer implementation.
//!
//! Implements the [`UserRepository`] domain interface on top of a
//! [`UserDao`], adding the id cache, lazy settings and password hashing:
//!
//! ```text
//! caller
//!   ↓ Arc<dyn UserRepository>
//! UserRepositoryImpl          ← cache, settings, hashing, cascade policy
//!   ↓ Arc<dyn UserDao>
//! SqliteUserDao
//!   ↓
//! SQLite
//! ```
//!
//! [`UserRepository`]: crate::traits::UserRepository
//! [`UserDao`]: crate::dao::UserDao

use crate::cache::UserCache;
use crate::dao::{SqliteUserDao, UserDao, UserRow};
use crate::{traits::UserRepository, DatabasePoolInterface};
use async_trait::async_trait;
use lineage_config::AppConfig;
use lineage_core::{
    setting_names, truncate_setting_value, LineageError, LineageResult, PasswordCheck,
    PendingChangePolicy, TreeId, User, UserId,
};
use lineage_security::{PasswordHasher, PasswordHasherInterface};
use shaku::Component;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Repository implementation that orchestrates [`UserDao`] access.
///
/// [`UserDao`]: crate::dao::UserDao
#[derive(Component)]
#[shaku(interface = UserRepository)]
pub struct UserRepositoryImpl {
    #[shaku(inject)]
    user_dao: Arc<dyn UserDao>,

    #[shaku(inject)]
    hasher: Arc<dyn PasswordHasherInterface>,

    cache: UserCache,

    pending_change_policy: PendingChangePolicy,
}

impl UserRepositoryImpl {
    /// Creates a new `UserRepositoryImpl` with an empty cache and the
    /// default pending change policy.
    #[must_use]
    pub fn new(user_dao: Arc<dyn UserDao>, hasher: Arc<dyn PasswordHasherInterface>) -> Self {
        Self {
            user_dao,
            hasher,
            cache: UserCache::new(),
            pending_change_policy: PendingChangePolicy::default(),
        }
    }

    /// Wires a SQLite-backed repository from application configuration.
    pub fn from_config(pool: Arc<dyn DatabasePoolInterface>, config: &AppConfig) -> LineageResult<Self> {
        let hasher = PasswordHasher::from_config(&config.security)?;
        let policy = config.accounts.pending_change_policy()?;
        debug!("Repository: pending change policy {}", policy);

        Ok(Self::new(Arc::new(SqliteUserDao::new(pool)), Arc::new(hasher)).with_pending_change_policy(policy))
    }

    /// Sets the policy applied to pending changes of deleted users.
    #[must_use]
    pub fn with_pending_change_policy(mut self, policy: PendingChangePolicy) -> Self {
        self.pending_change_policy = policy;
        self
    }

    /// Returns the id cache.
    #[must_use]
    pub fn cache(&self) -> &UserCache {
        &self.cache
    }

    async fn find_resolved(&self, id: Option<UserId>) -> LineageResult<Option<User>> {
        match id {
            Some(id) => self.find_by_id(id).await,
            None => Ok(None),
        }
    }

    async fn ensure_settings(&self, user: &mut User) -> LineageResult<()> {
        if user.settings.is_loaded() {
            return Ok(());
        }

        let values = if user.is_anonymous() {
            Default::default()
        } else {
            self.user_dao.load_settings(user.id).await?
        };
        user.settings.load(values);
        Ok(())
    }
}

fn into_users(rows: Vec<UserRow>) -> Vec<User> {
    rows.into_iter().map(User::from).collect()
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    async fn find_by_id(&self, id: UserId) -> LineageResult<Option<User>> {
        if let Some(cached) = self.cache.get(id) {
            return Ok(cached);
        }

        debug!("Repository: find_by_id {}", id);
        let user = self.user_dao.find_row(id).await?.map(User::from);
        self.cache.insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_identifier(&self, identifier: &str) -> LineageResult<Option<User>> {
        debug!("Repository: find_by_identifier {}", identifier);
        let id = self.user_dao.find_id_by_identifier(identifier).await?;
        self.find_resolved(id).await
    }

    async fn find_by_username(&self, username: &str) -> LineageResult<Option<User>> {
        debug!("Repository: find_by_username {}", username);
        let id = self.user_dao.find_id_by_username(username).await?;
        self.find_resolved(id).await
    }

    async fn find_by_email(&self, email: &str) -> LineageResult<Option<User>> {
        debug!("Repository: find_by_email {}", email);
        let id = self.user_dao.find_id_by_email(email).await?;
        self.find_resolved(id).await
    }

    async fn find_by_genealogy_record(&self, tree_id: TreeId, xref: &str) -> LineageResult<Option<User>> {
        debug!("Repository: find_by_genealogy_record {} in tree {}", xref, tree_id.into_inner());
        let id = self.user_dao.find_id_by_genealogy_record(tree_id, xref).await?;
        self.find_resolved(id).await
    }

    async fn find_latest_to_register(&self) -> LineageResult<Option<User>> {
        let id = self.user_dao.find_id_latest_registration().await?;
        self.find_resolved(id).await
    }

    async fn create(
        &self,
        username: &str,
        display_name: &str,
        email: &str,
        password: &str,
    ) -> LineageResult<User> {
        info!("Repository: creating user {}", username);

        let password_hash = self.hasher.hash(password)?;
        let id = self
            .user_dao
            .insert(username, display_name, email, &password_hash)
            .await?;

        // An earlier miss for this id must not hide the new row
        self.cache.evict(id);

        let user = self
            .find_by_identifier(username)
            .await?
            .ok_or_else(|| LineageError::not_found("User", username))?;

        // The identifier lookup also matches emails
        if user.id != id {
            warn!("Username {} of new user {} resolves to user {}", username, id, user.id);
            return Err(LineageError::internal(format!(
                "username {} of new user {} resolves to user {}",
                username, id, user.id
            )));
        }

        Ok(user)
    }

    async fn count(&self) -> LineageResult<u64> {
        self.user_dao.count_real().await
    }

    async fn list_all(&self) -> LineageResult<Vec<User>> {
        debug!("Repository: list_all");
        Ok(into_users(self.user_dao.list_all().await?))
    }

    async fn list_admins(&self) -> LineageResult<Vec<User>> {
        let rows = self
            .user_dao
            .list_with_setting(setting_names::CAN_ADMIN, "1")
            .await?;
        Ok(into_users(rows))
    }

    async fn list_logged_in(&self) -> LineageResult<Vec<User>> {
        Ok(into_users(self.user_dao.list_logged_in().await?))
    }

    async fn list_unapproved(&self) -> LineageResult<Vec<User>> {
        let rows = self
            .user_dao
            .list_without_setting(setting_names::VERIFIED_BY_ADMIN, "1")
            .await?;
        Ok(into_users(rows))
    }

    async fn list_unverified(&self) -> LineageResult<Vec<User>> {
        let rows = self
            .user_dao
            .list_without_setting(setting_names::VERIFIED, "1")
            .await?;
        Ok(into_users(rows))
    }

    async fn check_password(&self, user: &User, password: &str) -> LineageResult<PasswordCheck> {
        if user.is_anonymous() {
            return Ok(PasswordCheck::Rejected);
        }

        debug!("Repository: check_password for user {}", user.id);
        let Some(stored) = self.user_dao.password_hash(user.id).await? else {
            return Ok(PasswordCheck::Rejected);
        };

        match self.hasher.verify(password, &stored) {
            Ok(true) => {}
            Ok(false) => return Ok(PasswordCheck::Rejected),
            Err(e) => {
                warn!("Stored password hash of user {} is unusable: {}", user.id, e);
                return Ok(PasswordCheck::Rejected);
            }
        }

        if !self.hasher.needs_rehash(&stored) {
            return Ok(PasswordCheck::Accepted);
        }

        let upgraded = self.hasher.hash(password)?;
        self.user_dao.update_password_hash(user.id, &upgraded).await?;
        info!("Upgraded password hash of user {}", user.id);
        Ok(PasswordCheck::AcceptedAndRehashed)
    }

    async fn set_username<'a>(&self, user: &'a mut User, username: &str) -> LineageResult<&'a mut User> {
        if user.username != username {
            debug!("Repository: set_username for user {}", user.id);
            self.user_dao.update_username(user.id, username).await?;
            user.username = username.to_string();
            self.cache.store(user);
        }
        Ok(user)
    }

    async fn set_display_name<'a>(
        &self,
        user: &'a mut User,
        display_name: &str,
    ) -> LineageResult<&'a mut User> {
        if user.display_name != display_name {
            debug!("Repository: set_display_name for user {}", user.id);
            self.user_dao.update_display_name(user.id, display_name).await?;
            user.display_name = display_name.to_string();
            self.cache.store(user);
        }
        Ok(user)
    }

    async fn set_email<'a>(&self, user: &'a mut User, email: &str) -> LineageResult<&'a mut User> {
        if user.email != email {
            debug!("Repository: set_email for user {}", user.id);
            self.user_dao.update_email(user.id, email).await?;
            user.email = email.to_string();
            self.cache.store(user);
        }
        Ok(user)
    }

    async fn set_password<'a>(&self, user: &'a mut User, password: &str) -> LineageResult<&'a mut User> {
        debug!("Repository: set_password for user {}", user.id);
        let password_hash = self.hasher.hash(password)?;
        self.user_dao.update_password_hash(user.id, &password_hash).await?;
        Ok(user)
    }

    async fn get_setting(&self, user: &mut User, name: &str) -> LineageResult<Option<String>> {
        self.ensure_settings(user).await?;
        Ok(user.settings.get(name).map(str::to_string))
    }

    async fn set_setting(&self, user: &mut User, name: &str, value: Option<&str>) -> LineageResult<()> {
        if user.is_anonymous() {
            return Ok(());
        }

        let Some(value) = value else {
            debug!("Repository: delete setting {} of user {}", name, user.id);
            self.user_dao.delete_setting(user.id, name).await?;
            user.settings.remove(name);
            return Ok(());
        };

        self.ensure_settings(user).await?;
        let value = truncate_setting_value(value);
        if user.settings.get(name) == Some(value) {
            return Ok(());
        }

        debug!("Repository: set setting {} of user {}", name, user.id);
        self.user_dao.upsert_setting(user.id, name, value).await?;
        user.settings.set(name, value.to_string());
        Ok(())
    }

    async fn delete(&self, user: &User) -> LineageResult<bool> {
        if user.is_anonymous() {
            return Ok(false);
        }

        info!("Repository: deleting user {} ({})", user.id, user.username);
        let deleted = self
            .user_dao
            .delete_cascade(user.id, self.pending_change_policy)
            .await?;
        self.cache.evict(user.id);
        Ok(deleted)
    }

    fn evict(&self, id: UserId) {
        self.cache.evict(id);
    }

    fn clear_cache(&self) {
        debug!("Repository: clearing user cache");
        self.cache.clear();
    }
}

impl std::fmt::Debug for UserRepositoryImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRepositoryImpl")
            .field("cached", &self.cache.len())
            .field("pending_change_policy", &self.pending_change_policy)
            .finish_non_exhaustive()
    }
}
