// src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error(transparent)]
    Webhook(#[from] WebhookError),
}

/// Failures of a single webhook round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    /// DNS, refused connection, reset, unreadable body
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}")]
    HttpError { status: u16 },

    #[error("Request timeout")]
    Timeout,
}

impl WebhookError {
    /// Network failures, timeouts and 5xx may resolve on their own; 4xx will not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout => true,
            Self::HttpError { status } => (500..=599).contains(status),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::HttpError { status } if *status >= 500 => "server_error",
            Self::HttpError { .. } => "client_error",
            Self::Timeout => "timeout",
        }
    }
}

impl From<reqwest::Error> for WebhookError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if let Some(status) = e.status() {
            Self::HttpError { status: status.as_u16() }
        } else {
            Self::Network(e.to_string())
        }
    }
}
