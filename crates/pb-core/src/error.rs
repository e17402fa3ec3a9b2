//! # AppError
//!
//! Centralized error handling for the proposal board.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all pb-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Post, Vote)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// The requester may not touch this resource (e.g., editing someone else's post)
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Malformed input that the caller can fix
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A uniqueness rule was violated (e.g., second vote by the same member)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (e.g., DB down)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn post_not_found(id: crate::PostId) -> Self {
        AppError::NotFound("Post".to_string(), id.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(format!("{err:#}"))
    }
}

/// A specialized Result type for proposal board logic.
pub type Result<T> = std::result::Result<T, AppError>;
