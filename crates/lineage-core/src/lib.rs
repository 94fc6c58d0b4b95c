//! # Lineage Core
//!
//! Core types and error definitions for the Lineage user store.
//! This crate holds the user entity, its lazily loaded settings, and the
//! identifiers and result types shared by the config, security and
//! repository crates.

pub mod domain;
pub mod error;
pub mod id;
pub mod result;
pub mod telemetry;

pub use domain::*;
pub use error::*;
pub use id::*;
pub use result::*;

// Re-export shaku for dependency injection
pub use shaku::Interface;
