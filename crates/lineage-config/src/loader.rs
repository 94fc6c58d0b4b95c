//! Configuration loader with layered sources.

use crate::AppConfig;
use config::{Config, ConfigError, Environment, File};
use lineage_core::LineageError;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Configuration loader with runtime refresh support.
#[derive(Clone)]
pub struct ConfigLoader {
    config: Arc<RwLock<AppConfig>>,
    config_dir: String,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// Configuration is loaded from multiple sources in order:
    /// 1. `config/default.toml` - Default values
    /// 2. `config/{environment}.toml` - Environment-specific overrides
    /// 3. `config/local.toml` - Local overrides
    /// 4. Environment variables with `LINEAGE_` prefix
    pub fn new(config_dir: impl Into<String>) -> Result<Self, LineageError> {
        let config_dir = config_dir.into();
        let config = Self::load_config(&config_dir)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_dir,
        })
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> Result<Self, LineageError> {
        Self::new("./config")
    }

    /// Returns the current configuration.
    pub async fn get(&self) -> AppConfig {
        self.config.read().await.clone()
    }

    /// Reloads the configuration from disk.
    pub async fn reload(&self) -> Result<(), LineageError> {
        let new_config = Self::load_config(&self.config_dir)?;
        let mut config = self.config.write().await;
        *config = new_config;
        info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Loads configuration from the specified directory.
    fn load_config(config_dir: &str) -> Result<AppConfig, LineageError> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let environment = std::env::var("LINEAGE_ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder();

        for name in ["default", environment.as_str(), "local"] {
            let path = format!("{}/{}.toml", config_dir, name);
            if Path::new(&path).exists() {
                debug!("Loading config from: {}", path);
                builder = builder.add_source(File::with_name(&path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("LINEAGE")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_error_to_lineage_error)?;

        let app_config: AppConfig = config
            .try_deserialize()
            .map_err(config_error_to_lineage_error)?;

        Self::validate_config(&app_config)?;

        Ok(app_config)
    }

    /// Validates the configuration.
    fn validate_config(config: &AppConfig) -> Result<(), LineageError> {
        if config.database.url.is_empty() {
            return Err(LineageError::Configuration("Database URL is required".to_string()));
        }

        if config.database.max_connections == 0 {
            return Err(LineageError::Configuration(
                "database.max_connections must be at least 1".to_string(),
            ));
        }

        config.accounts.pending_change_policy()?;

        Ok(())
    }
}

fn config_error_to_lineage_error(err: ConfigError) -> LineageError {
    LineageError::Configuration(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PendingChangeMode;
    use lineage_core::PendingChangePolicy;
    use std::fs;

    #[tokio::test]
    async fn test_loads_default_toml() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            r#"
            [database]
            url = "sqlite::memory:"
            max_connections = 1

            [accounts]
            pending_changes = "reassign"
            pending_changes_owner = 1
            "#,
        )
        .unwrap();

        let loader = ConfigLoader::new(dir.path().to_string_lossy()).unwrap();
        let config = loader.get().await;
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.database.max_connections, 1);
        assert_eq!(config.accounts.pending_changes, PendingChangeMode::Reassign);
        assert_eq!(
            config.accounts.pending_change_policy().unwrap(),
            PendingChangePolicy::ReassignTo(lineage_core::UserId::new(1))
        );
    }

    #[tokio::test]
    async fn test_missing_directory_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ConfigLoader::new(dir.path().join("absent").to_string_lossy()).unwrap();
        let config = loader.get().await;
        assert_eq!(config.app.name, "lineage");
        assert!(config.database.run_migrations);
    }

    #[test]
    fn test_reassign_without_owner_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[accounts]\npending_changes = \"reassign\"\n",
        )
        .unwrap();

        let result = ConfigLoader::new(dir.path().to_string_lossy());
        assert!(matches!(result, Err(LineageError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_reload_picks_up_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("default.toml");
        fs::write(&path, "[database]\nurl = \"sqlite://first.db\"\n").unwrap();

        let loader = ConfigLoader::new(dir.path().to_string_lossy()).unwrap();
        assert_eq!(loader.get().await.database.url, "sqlite://first.db");

        fs::write(&path, "[database]\nurl = \"sqlite://second.db\"\n").unwrap();
        loader.reload().await.unwrap();
        assert_eq!(loader.get().await.database.url, "sqlite://second.db");
    }
}
