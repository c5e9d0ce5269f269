//! crates/photo_sharing_core/src/error.rs
//!
//! The error type returned by every core operation. Transport adapters map
//! each variant to exactly one status code.

use crate::input::ValidationError;
use crate::ports::PortError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No session, or the session no longer resolves.
    #[error("Unauthorized. Please login.")]
    Unauthorized,

    /// Authenticated, but the policy denies the action.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Conflict(String),

    /// Login failed. Deliberately does not say whether the login name exists.
    #[error("Invalid login name or password")]
    InvalidCredentials,

    /// Logout was requested without an active session.
    #[error("Not logged in")]
    NotAuthenticated,

    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl From<PortError> for EngineError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(what) => EngineError::NotFound(what),
            PortError::Conflict(what) => EngineError::Conflict(what),
            PortError::Unexpected(what) => EngineError::Internal(what),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
