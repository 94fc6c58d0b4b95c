//! Result type aliases for Lineage.

use crate::LineageError;

/// A specialized `Result` type for Lineage operations.
pub type LineageResult<T> = Result<T, LineageError>;
