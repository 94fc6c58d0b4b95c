//! Password hashing using Argon2.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use lineage_config::SecurityConfig;
use lineage_core::{Interface, LineageError, LineageResult};
use shaku::Component;
use std::sync::Arc;
use tracing::debug;

/// Interface for password hashing operations.
///
/// This trait abstracts password hashing functionality for dependency injection.
pub trait PasswordHasherInterface: Interface + Send + Sync {
    /// Hashes a password with a fresh random salt.
    fn hash(&self, password: &str) -> LineageResult<String>;

    /// Verifies a password against a hash.
    ///
    /// Returns `Ok(false)` on mismatch and an error when the hash cannot be
    /// parsed or was produced by an unsupported algorithm.
    fn verify(&self, password: &str, hash: &str) -> LineageResult<bool>;

    /// Checks if a hash was produced with other than the current parameters.
    fn needs_rehash(&self, hash: &str) -> bool;
}

/// Password hasher service using Argon2id.
#[derive(Component, Clone)]
#[shaku(interface = PasswordHasherInterface)]
pub struct PasswordHasher {
    argon2: Arc<Argon2<'static>>,
}

impl PasswordHasher {
    /// Creates a new password hasher with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::with_params(Params::DEFAULT)
    }

    /// Creates a new password hasher with custom parameters.
    #[must_use]
    pub fn with_params(params: Params) -> Self {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        Self {
            argon2: Arc::new(argon2),
        }
    }

    /// Creates a password hasher from a memory cost in MiB.
    #[must_use]
    pub fn with_cost(memory_mib: u32) -> Self {
        let params = Params::new(
            memory_mib * 1024, // Memory cost in KiB
            Params::DEFAULT_T_COST,
            Params::DEFAULT_P_COST,
            None,
        )
        .unwrap_or(Params::DEFAULT);

        Self::with_params(params)
    }

    /// Creates a password hasher from the security configuration.
    pub fn from_config(config: &SecurityConfig) -> LineageResult<Self> {
        let params = Params::new(
            config.password_memory_cost_mib.saturating_mul(1024),
            config.password_time_cost,
            config.password_parallelism,
            None,
        )
        .map_err(|e| LineageError::Configuration(format!("Invalid password hashing parameters: {}", e)))?;

        Ok(Self::with_params(params))
    }

    /// Returns the parameters new hashes are produced with.
    #[must_use]
    pub fn params(&self) -> &Params {
        self.argon2.params()
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasherInterface for PasswordHasher {
    fn hash(&self, password: &str) -> LineageResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| LineageError::Internal(format!("Failed to hash password: {}", e)))?;

        debug!("Password hashed successfully");
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> LineageResult<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| LineageError::Internal(format!("Invalid password hash format: {}", e)))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => {
                debug!("Password verified successfully");
                Ok(true)
            }
            Err(argon2::password_hash::Error::Password) => {
                debug!("Password verification failed: incorrect password");
                Ok(false)
            }
            Err(e) => Err(LineageError::Internal(format!(
                "Password verification error: {}",
                e
            ))),
        }
    }

    fn needs_rehash(&self, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return true;
        };

        if parsed.algorithm != Algorithm::Argon2id.ident() {
            return true;
        }

        if parsed.version != Some(Version::V0x13.into()) {
            return true;
        }

        let Ok(stored) = Params::try_from(&parsed) else {
            return true;
        };

        let current = self.argon2.params();
        stored.m_cost() != current.m_cost()
            || stored.t_cost() != current.t_cost()
            || stored.p_cost() != current.p_cost()
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher").finish_non_exhaustive()
    }
}
