//! Error types surfaced by every public call

use thiserror::Error;

use crate::types::ApiErrorBody;

/// The remote service answered with a structured error payload.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("remote service error: {error}")]
pub struct RemoteServiceError {
    /// HTTP status of the response that carried the error
    pub http_status: u16,
    /// The error record (first entry when the service sent a collection)
    pub error: ApiErrorBody,
}

impl RemoteServiceError {
    #[must_use]
    pub fn new(http_status: u16, error: ApiErrorBody) -> Self {
        Self { http_status, error }
    }

    /// Status code from the error body, falling back to the HTTP status.
    #[must_use]
    pub fn status(&self) -> u16 {
        if self.error.status == 0 {
            self.http_status
        } else {
            self.error.status
        }
    }

    /// Application error code, e.g. `not_found`.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.error.code
    }
}

/// Categories of errors, used for retry decisions and log labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller precondition violation; never reaches the network
    InvalidArgument,
    /// Structured error from the service; never retried
    Remote,
    /// No usable response; retryable once
    Transport,
    /// Token endpoint rejected the credentials
    Authentication,
    /// Body could not be encoded or decoded
    Serialization,
    /// Client misconfiguration
    Config,
}

/// Main error type
#[derive(Error, Debug)]
pub enum BoxError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Remote(#[from] RemoteServiceError),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BoxError {
    /// Shorthand for a missing or empty required argument.
    pub fn missing(argument: &str) -> Self {
        Self::InvalidArgument(format!("{argument} must not be empty"))
    }

    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidArgument(_) => ErrorCategory::InvalidArgument,
            Self::Remote(_) => ErrorCategory::Remote,
            Self::Transport(_) => ErrorCategory::Transport,
            Self::Auth(_) => ErrorCategory::Authentication,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Config(_) => ErrorCategory::Config,
        }
    }

    /// Only transport failures are eligible for the automatic retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Transport
    }

    /// The structured error record, if the service sent one.
    #[must_use]
    pub fn remote(&self) -> Option<&RemoteServiceError> {
        match self {
            Self::Remote(remote) => Some(remote),
            _ => None,
        }
    }

    /// Stable label for logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self.category() {
            ErrorCategory::InvalidArgument => "invalid_argument",
            ErrorCategory::Remote => "remote",
            ErrorCategory::Transport => "transport",
            ErrorCategory::Authentication => "auth",
            ErrorCategory::Serialization => "serialization",
            ErrorCategory::Config => "config",
        }
    }
}

impl From<serde_json::Error> for BoxError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for library operations
pub type Result<T> = std::result::Result<T, BoxError>;
