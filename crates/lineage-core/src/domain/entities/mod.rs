//! Domain entities.

pub mod user;
pub mod user_settings;

pub use user::*;
pub use user_settings::*;
