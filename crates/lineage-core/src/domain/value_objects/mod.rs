//! Value objects.

pub mod password_check;
pub mod pending_change_policy;

pub use password_check::*;
pub use pending_change_policy::*;
