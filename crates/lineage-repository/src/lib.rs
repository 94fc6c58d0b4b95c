//! # Lineage Repository
//!
//! Four-layer data access hierarchy:
//!
//! ```text
//! caller
//!   ↓  Arc<dyn UserRepository>  (domain interface)
//! UserRepositoryImpl            (repository impl: cache, settings, hashing)
//!   ↓  Arc<dyn UserDao>         (DAO interface)
//! SqliteUserDao                 (DAO impl: SQLite / SQLx)
//!   ↓
//! SQLite
//! ```
//!
//! ## Structure
//!
//! ```text
//! src/
//!   traits.rs                    ← UserRepository trait
//!   cache.rs                     ← UserCache
//!   pool.rs                      ← DatabasePool, embedded migrations
//!   impl/
//!     user_repository_impl.rs    ← UserRepositoryImpl
//!   dao/
//!     user_dao.rs                ← UserDao trait
//!     impl/
//!       sqlite/
//!         user_dao_impl.rs       ← SqliteUserDao
//! ```
//!
//! The cache lives inside each [`UserRepositoryImpl`]; share one repository
//! instance (behind an `Arc`) to share its cache.

pub mod cache;
pub mod dao;
pub mod pool;
pub mod traits;
pub mod r#impl;

pub use cache::UserCache;
pub use dao::{SqliteUserDao, UserDao, UserRow};
pub use pool::*;
pub use traits::*;
pub use r#impl::UserRepositoryImpl;
