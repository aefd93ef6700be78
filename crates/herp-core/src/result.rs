//! Convenience result type alias for Herp.

use crate::error::AppError;

/// A specialized `Result` type for Herp operations.
pub type AppResult<T> = Result<T, AppError>;
