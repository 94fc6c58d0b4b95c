//! Unified error type for the user store.

use std::fmt::Debug;
use thiserror::Error;

/// Unified error type for Lineage.
///
/// Lookups never produce `NotFound`: an absent user is `Ok(None)`.
/// `NotFound` is reserved for operations that require an existing row,
/// such as re-reading a user immediately after inserting it.
#[derive(Error, Debug)]
pub enum LineageError {
    /// Resource not found
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unique constraint violated by the store (duplicate username or email)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Store unavailable or query failed
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LineageError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a not found error for a resource.
    #[must_use]
    pub fn not_found<T: ToString>(resource_type: &'static str, id: T) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Checks if this error came from the store and might succeed on a later attempt.
    ///
    /// The repository itself never retries.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for LineageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    return Self::Conflict(db_err.message().to_string());
                }
                if let Some(code) = db_err.code() {
                    // PostgreSQL / MySQL / SQLite (UNIQUE, PRIMARY KEY)
                    if matches!(&*code, "23505" | "1062" | "2067" | "1555") {
                        return Self::Conflict(db_err.message().to_string());
                    }
                }
                Self::Database(err.to_string())
            }
            _ => Self::Database(err.to_string()),
        }
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::migrate::MigrateError> for LineageError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::Database(format!("Migration failed: {}", err))
    }
}

impl From<serde_json::Error> for LineageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization error: {}", err))
    }
}
