//! Convenience result type alias for Arbor.

use crate::error::AppError;

/// A specialized `Result` type for Arbor operations.
///
/// Defined once so that every crate does not need to spell out
/// `Result<T, AppError>` explicitly.
pub type AppResult<T> = Result<T, AppError>;
