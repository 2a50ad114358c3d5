//! Error types for desk operations
//!
//! Every variant carries a message fit to show the user. None of them is
//! fatal: the operation that raised it has not mutated anything.

use thiserror::Error;

use crate::domain::RequestStatus;

/// Errors from record store and manager operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeskError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Cannot move request from {from} to {to}")]
    InvalidTransition { from: RequestStatus, to: RequestStatus },
}

impl DeskError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { kind, id: id.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Result of a desk operation
pub type DeskResult<T> = Result<T, DeskError>;

/// Fail with a validation error naming the first blank required field
pub(crate) fn require_fields(fields: &[(&str, &str)]) -> DeskResult<()> {
    if let Some((name, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(DeskError::validation(format!("Please fill in the required field: {}", name)));
    }
    Ok(())
}
