//! Application configuration structures.

use lineage_core::telemetry::{LogFormat, TelemetryConfig};
use lineage_core::{LineageError, PendingChangePolicy, UserId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name and metadata.
    #[serde(default)]
    pub app: AppMetadata,

    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Password hashing configuration.
    #[serde(default)]
    pub security: SecurityConfig,

    /// Account lifecycle configuration.
    #[serde(default)]
    pub accounts: AccountsConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Application metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppMetadata {
    /// Application name.
    pub name: String,
    /// Application version.
    pub version: String,
    /// Environment (development, staging, production).
    pub environment: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "lineage".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database URL.
    pub url: String,
    /// Minimum connection pool size.
    pub min_connections: u32,
    /// Maximum connection pool size.
    pub max_connections: u32,
    /// Connection timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Idle timeout in seconds.
    pub idle_timeout_secs: u64,
    /// Enable SQL statement logging.
    pub log_queries: bool,
    /// Apply embedded migrations when the pool is created.
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://lineage.db?mode=rwc".to_string(),
            min_connections: 1,
            max_connections: 5,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
            log_queries: false,
            run_migrations: true,
        }
    }
}

impl DatabaseConfig {
    /// Returns the connect timeout as a Duration.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Returns the idle timeout as a Duration.
    #[must_use]
    pub const fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

/// Password hashing configuration (Argon2id).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Memory cost in MiB.
    pub password_memory_cost_mib: u32,
    /// Number of iterations.
    pub password_time_cost: u32,
    /// Degree of parallelism.
    pub password_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            password_memory_cost_mib: 19,
            password_time_cost: 2,
            password_parallelism: 1,
        }
    }
}

/// How a deleted user's unaccepted pending changes are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingChangeMode {
    /// Keep the changes under the deleted user's id.
    #[default]
    Retain,
    /// Reassign the changes to `pending_changes_owner`.
    Reassign,
    /// Delete the changes.
    Delete,
}

/// Account lifecycle configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountsConfig {
    /// Handling of pending changes on user deletion.
    pub pending_changes: PendingChangeMode,
    /// Receiving account when `pending_changes = "reassign"`.
    pub pending_changes_owner: Option<i64>,
}

impl AccountsConfig {
    /// Builds the deletion policy described by this configuration.
    pub fn pending_change_policy(&self) -> Result<PendingChangePolicy, LineageError> {
        match (self.pending_changes, self.pending_changes_owner) {
            (PendingChangeMode::Retain, _) => Ok(PendingChangePolicy::Retain),
            (PendingChangeMode::Delete, _) => Ok(PendingChangePolicy::Delete),
            (PendingChangeMode::Reassign, Some(owner)) if owner > 0 => {
                Ok(PendingChangePolicy::ReassignTo(UserId::new(owner)))
            }
            (PendingChangeMode::Reassign, _) => Err(LineageError::Configuration(
                "accounts.pending_changes_owner must be a positive user id when pending_changes = \"reassign\""
                    .to_string(),
            )),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter (e.g. "info,lineage=debug").
    pub log_level: String,
    /// Log format (json, pretty).
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        let telemetry = TelemetryConfig::default();
        Self {
            log_level: telemetry.filter,
            log_format: telemetry.format,
        }
    }
}

impl ObservabilityConfig {
    /// Returns the tracing setup for this configuration.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryConfig {
        TelemetryConfig {
            filter: self.log_level.clone(),
            format: self.log_format,
            ..TelemetryConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_retain() {
        let accounts = AccountsConfig::default();
        assert_eq!(accounts.pending_change_policy().unwrap(), PendingChangePolicy::Retain);
    }

    #[test]
    fn test_reassign_policy_requires_owner() {
        let accounts = AccountsConfig {
            pending_changes: PendingChangeMode::Reassign,
            pending_changes_owner: None,
        };
        assert!(matches!(
            accounts.pending_change_policy(),
            Err(LineageError::Configuration(_))
        ));

        let accounts = AccountsConfig {
            pending_changes: PendingChangeMode::Reassign,
            pending_changes_owner: Some(1),
        };
        assert_eq!(
            accounts.pending_change_policy().unwrap(),
            PendingChangePolicy::ReassignTo(UserId::new(1))
        );
    }

    #[test]
    fn test_observability_to_telemetry() {
        let observability = ObservabilityConfig {
            log_level: "warn".to_string(),
            log_format: LogFormat::Json,
        };
        let telemetry = observability.telemetry();
        assert_eq!(telemetry.filter, "warn");
        assert_eq!(telemetry.format, LogFormat::Json);
    }

    #[test]
    fn test_database_timeouts() {
        let config = DatabaseConfig::default();
        assert_eq!(config.connect_timeout(), Duration::from_secs(30));
        assert_eq!(config.idle_timeout(), Duration::from_secs(600));
    }
}
