//! Synchronous submission errors

use thiserror::Error;

/// Returned by `submit` before any attempt is made.
///
/// `InvalidInput` is also delivered to the callback; the other variants have
/// no callback to deliver to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not initialized: {0}")]
    NotInitialized(String),
}
