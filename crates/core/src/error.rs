//! Client-side validation error model.

use thiserror::Error;

/// Result type used by request validation.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Raised before a request leaves the process. Anything the backend decides
/// (authority, balances, persistence) is reported through the transport error
/// instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. empty).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
