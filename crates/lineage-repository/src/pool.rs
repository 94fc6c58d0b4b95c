//! Database connection pool management.

use async_trait::async_trait;
use lineage_config::DatabaseConfig;
use lineage_core::{Interface, LineageError, LineageResult};
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use std::str::FromStr;
use tracing::{info, warn};

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Interface for database pool operations.
///
/// This trait abstracts database pool functionality for dependency injection.
#[async_trait]
pub trait DatabasePoolInterface: Interface + Send + Sync {
    /// Returns a reference to the underlying SQLite pool.
    fn inner(&self) -> &SqlitePool;

    /// Checks if the database connection is healthy.
    async fn health_check(&self) -> LineageResult<()>;

    /// Runs database migrations.
    async fn run_migrations(&self) -> LineageResult<()>;

    /// Closes the database pool.
    async fn close(&self);
}

/// Database pool wrapper.
pub struct DatabasePool {
    pool: SqlitePool,
}

impl DatabasePool {
    /// Creates a new database pool from configuration.
    ///
    /// Foreign keys are enforced on every connection. Migrations run when
    /// `config.run_migrations` is set.
    pub async fn new(config: &DatabaseConfig) -> LineageResult<Self> {
        info!("Connecting to SQLite database...");

        let mut options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| LineageError::Configuration(format!("Invalid database URL: {}", e)))?
            .foreign_keys(true);
        if !config.log_queries {
            options = options.disable_statement_logging();
        }

        let pool = SqlitePoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout())
            .idle_timeout(Some(config.idle_timeout()))
            .connect_with(options)
            .await
            .map_err(|e| {
                warn!("Failed to connect to database: {}", e);
                LineageError::Database(format!("Failed to connect: {}", e))
            })?;

        info!("SQLite connection pool established");
        let pool = Self { pool };

        if config.run_migrations {
            pool.run_migrations().await?;
        }

        Ok(pool)
    }

    /// Creates a `DatabasePool` around a pre-existing pool.
    #[must_use]
    pub fn with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DatabasePoolInterface for DatabasePool {
    fn inner(&self) -> &SqlitePool {
        &self.pool
    }

    async fn health_check(&self) -> LineageResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| LineageError::Database(format!("Health check failed: {}", e)))?;
        Ok(())
    }

    async fn run_migrations(&self) -> LineageResult<()> {
        info!("Running database migrations...");
        MIGRATOR.run(&self.pool).await?;
        info!("Database migrations completed");
        Ok(())
    }

    async fn close(&self) {
        info!("Closing database connection pool...");
        self.pool.close().await;
        info!("Database connection pool closed");
    }
}

impl std::ops::Deref for DatabasePool {
    type Target = SqlitePool;

    fn deref(&self) -> &Self::Target {
        &self.pool
    }
}

impl std::fmt::Debug for DatabasePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabasePool")
            .field("size", &self.pool.size())
            .field("num_idle", &self.pool.num_idle())
            .finish()
    }
}

/// Creates a shared database pool.
pub async fn create_pool(config: &DatabaseConfig) -> LineageResult<std::sync::Arc<DatabasePool>> {
    let pool = DatabasePool::new(config).await?;
    Ok(std::sync::Arc::new(pool))
}
