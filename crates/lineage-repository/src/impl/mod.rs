//! Repository layer implementations.
//!
//! Trait definitions live in the parent module (`traits.rs`).

pub mod user_repository_impl;

pub use user_repository_impl::UserRepositoryImpl;
