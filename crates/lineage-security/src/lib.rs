//! # Lineage Security
//!
//! Credential hashing for the Lineage user store. Plaintext passwords are
//! only ever handed to the hasher; they are never stored or logged.

pub mod password;

pub use password::*;
