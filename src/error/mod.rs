//! Unified error handling for the warding engine

use thiserror::Error;

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Raised by the endpoint guard when the generated checker denies access.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Raised by the role deletion guard while the role is still referenced.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Persistence collaborator failure, propagated unmodified.
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl AppError {
    /// The conflict raised when deleting a role that users still reference.
    pub fn still_in_use(slug: &str) -> Self {
        AppError::Conflict(format!("This {} is still in use!", slug))
    }
}
