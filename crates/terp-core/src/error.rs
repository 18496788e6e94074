//! Transport error type
//!
//! Every failure talking to the assistant backend collapses into one error.
//! Callers never branch on the cause; they absorb it into a fallback value.

use thiserror::Error;

/// Network failure, non-2xx status, or malformed response body.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    pub status: Option<u16>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    /// A response outside the 2xx class
    pub fn status(code: u16) -> Self {
        Self {
            message: format!("HTTP error! status: {}", code),
            status: Some(code),
        }
    }

    /// A task that panicked or was cancelled before producing a response
    pub fn interrupted(reason: impl std::fmt::Display) -> Self {
        Self::new(format!("request interrupted: {}", reason))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            message: err.to_string(),
            status: err.status().map(|s| s.as_u16()),
        }
    }
}
