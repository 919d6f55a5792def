//! Structured request failures.

use hrdesk_core::DomainError;

/// Message shown when the backend supplied nothing better.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Why a request did not produce a usable response.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The request never completed (connection refused, timeout, reset).
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a non-2xx status.
    #[error("API error ({status}): {}", .message.as_deref().unwrap_or("<no message>"))]
    Api { status: u16, message: Option<String> },

    /// A 2xx body did not match the expected shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// Rejected locally; nothing was sent.
    #[error(transparent)]
    Validation(#[from] DomainError),
}

/// Coarse classification used by callers to pick a presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Unauthenticated,
    Forbidden,
    Validation,
    Server,
    Decode,
}

impl ApiError {
    pub fn api(status: u16, message: Option<String>) -> Self {
        Self::Api { status, message }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network(_) => ErrorKind::Transport,
            ApiError::Parse(_) => ErrorKind::Decode,
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::Api { status, .. } => match *status {
                401 => ErrorKind::Unauthenticated,
                403 => ErrorKind::Forbidden,
                400..=499 => ErrorKind::Validation,
                _ => ErrorKind::Server,
            },
        }
    }

    /// Text suitable for an inline notification.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Api {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            ApiError::Validation(DomainError::Validation(msg) | DomainError::InvalidId(msg)) => {
                msg.clone()
            }
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Parse(err.to_string())
    }
}
