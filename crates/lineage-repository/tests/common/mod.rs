//! Common test infrastructure for database integration tests.

#![allow(dead_code)]

use lineage_config::{DatabaseConfig, SecurityConfig};
use lineage_core::telemetry::{init_telemetry, TelemetryConfig};
use lineage_core::{PendingChangePolicy, TreeId, UserId};
use lineage_repository::{DatabasePool, DatabasePoolInterface, SqliteUserDao, UserRepositoryImpl};
use lineage_security::PasswordHasher;
use sqlx::SqlitePool;
use std::sync::{Arc, Once};
use tempfile::TempDir;

static TRACING: Once = Once::new();

/// Test database wrapper.
///
/// Owns a SQLite file in a temporary directory with migrations applied.
/// The directory is removed when the wrapper is dropped.
pub struct TestDatabase {
    _dir: TempDir,
    pool: Arc<DatabasePool>,
}

impl TestDatabase {
    /// Creates a fresh, migrated database.
    pub async fn new() -> Self {
        TRACING.call_once(|| {
            let _ = init_telemetry(&TelemetryConfig::default());
        });

        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("lineage-test.db");

        let config = DatabaseConfig {
            url: format!("sqlite://{}?mode=rwc", path.display()),
            min_connections: 1,
            max_connections: 4,
            log_queries: true,
            run_migrations: true,
            ..DatabaseConfig::default()
        };

        let pool = DatabasePool::new(&config)
            .await
            .expect("Failed to open test database");

        Self {
            _dir: dir,
            pool: Arc::new(pool),
        }
    }

    /// Returns the database pool.
    pub fn pool(&self) -> Arc<DatabasePool> {
        Arc::clone(&self.pool)
    }

    /// Returns the raw SQLite pool for seeding and assertions.
    pub fn sqlite(&self) -> &SqlitePool {
        self.pool.inner()
    }

    /// Builds a repository with a cheap hasher and the default policy.
    pub fn repository(&self) -> UserRepositoryImpl {
        self.repository_with_hasher(fast_hasher())
    }

    /// Builds a repository with the given hasher.
    pub fn repository_with_hasher(&self, hasher: PasswordHasher) -> UserRepositoryImpl {
        let dao = SqliteUserDao::new(self.pool());
        UserRepositoryImpl::new(Arc::new(dao), Arc::new(hasher))
    }

    /// Builds a repository that applies `policy` on deletion.
    pub fn repository_with_policy(&self, policy: PendingChangePolicy) -> UserRepositoryImpl {
        self.repository().with_pending_change_policy(policy)
    }

    /// Runs a statement and returns the number of affected rows.
    pub async fn execute(&self, sql: &str) -> u64 {
        sqlx::query(sql)
            .execute(self.sqlite())
            .await
            .unwrap_or_else(|e| panic!("Failed to run `{}`: {}", sql, e))
            .rows_affected()
    }

    /// Counts rows matching a `SELECT COUNT(*)` query.
    pub async fn count(&self, sql: &str) -> i64 {
        sqlx::query_scalar(sql)
            .fetch_one(self.sqlite())
            .await
            .unwrap_or_else(|e| panic!("Failed to run `{}`: {}", sql, e))
    }

    /// Creates a family tree.
    pub async fn create_tree(&self, name: &str) -> TreeId {
        let result = sqlx::query("INSERT INTO gedcom (gedcom_name) VALUES (?)")
            .bind(name)
            .execute(self.sqlite())
            .await
            .expect("Failed to create tree");
        TreeId::new(result.last_insert_rowid())
    }

    /// Links a user to an individual record in a tree.
    pub async fn link_record(&self, user: UserId, tree: TreeId, xref: &str) {
        sqlx::query(
            "INSERT INTO user_gedcom_setting (user_id, gedcom_id, setting_name, setting_value) VALUES (?, ?, 'gedcomid', ?)",
        )
        .bind(user.into_inner())
        .bind(tree.into_inner())
        .bind(xref)
        .execute(self.sqlite())
        .await
        .expect("Failed to link record");
    }

    /// Opens a session for a user.
    pub async fn open_session(&self, session_id: &str, user: UserId) {
        sqlx::query("INSERT INTO session (session_id, user_id, ip_address, session_data) VALUES (?, ?, '127.0.0.1', x'')")
            .bind(session_id)
            .bind(user.into_inner())
            .execute(self.sqlite())
            .await
            .expect("Failed to open session");
    }

    /// Seeds one row in every table that references `user` in `tree`.
    pub async fn seed_dependents(&self, user: UserId, tree: TreeId) {
        let id = user.into_inner();
        let tree_id = tree.into_inner();

        sqlx::query("INSERT INTO log (log_type, log_message, user_id) VALUES ('auth', 'login', ?)")
            .bind(id)
            .execute(self.sqlite())
            .await
            .expect("Failed to seed log");

        for status in ["accepted", "pending", "rejected"] {
            sqlx::query("INSERT INTO change (status, gedcom_id, xref, user_id) VALUES (?, ?, 'I1', ?)")
                .bind(status)
                .bind(tree_id)
                .bind(id)
                .execute(self.sqlite())
                .await
                .expect("Failed to seed change");
        }

        let block = sqlx::query(
            "INSERT INTO block (user_id, location, block_order, module_name) VALUES (?, 'main', 1, 'todays_events')",
        )
        .bind(id)
        .execute(self.sqlite())
        .await
        .expect("Failed to seed block")
        .last_insert_rowid();

        sqlx::query("INSERT INTO block_setting (block_id, setting_name, setting_value) VALUES (?, 'days', '7')")
            .bind(block)
            .execute(self.sqlite())
            .await
            .expect("Failed to seed block setting");

        self.link_record(user, tree, "I1").await;

        for name in ["CONTACT_USER_ID", "WEBMASTER_USER_ID"] {
            sqlx::query("INSERT INTO gedcom_setting (gedcom_id, setting_name, setting_value) VALUES (?, ?, ?)")
                .bind(tree_id)
                .bind(name)
                .bind(id.to_string())
                .execute(self.sqlite())
                .await
                .expect("Failed to seed tree setting");
        }

        sqlx::query("INSERT INTO user_setting (user_id, setting_name, setting_value) VALUES (?, 'language', 'en')")
            .bind(id)
            .execute(self.sqlite())
            .await
            .expect("Failed to seed user setting");

        sqlx::query(
            "INSERT INTO message (sender, ip_address, user_id, subject, body) VALUES ('admin', '127.0.0.1', ?, 'hi', 'hello')",
        )
        .bind(id)
        .execute(self.sqlite())
        .await
        .expect("Failed to seed message");
    }
}

/// Hasher with minimal cost parameters.
pub fn fast_hasher() -> PasswordHasher {
    hasher_with_time_cost(1)
}

/// Hasher with 1 MiB memory and the given time cost.
pub fn hasher_with_time_cost(time_cost: u32) -> PasswordHasher {
    PasswordHasher::from_config(&SecurityConfig {
        password_memory_cost_mib: 1,
        password_time_cost: time_cost,
        password_parallelism: 1,
    })
    .expect("Invalid test hasher parameters")
}
