//! Error types
//!
//! Provider failures travel as [`RemoteError`] with the provider's code and
//! message untouched. Argument checks made before any request is sent have
//! their own variants so callers can tell the two apart.

use std::fmt;
use thiserror::Error;

/// A result type using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Which side of the wire rejected a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Raised locally or by the transport for requests that never got a
    /// provider verdict.
    Client,
    /// The provider answered with an error body.
    Server,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Client => f.write_str("Client"),
            ErrorCategory::Server => f.write_str("Server"),
        }
    }
}

/// A categorized failure surfaced unchanged from the remote API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    pub category: ErrorCategory,
    pub error_code: String,
    pub message: String,
    pub request_id: Option<String>,
    pub http_status: Option<u16>,
}

impl RemoteError {
    pub fn client(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::Client,
            error_code: code.into(),
            message: message.into(),
            request_id: None,
            http_status: None,
        }
    }

    pub fn server(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::Server,
            error_code: code.into(),
            message: message.into(),
            request_id: None,
            http_status: None,
        }
    }

    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }

    pub fn with_http_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.error_code, self.message)?;
        if let Some(request_id) = &self.request_id {
            write!(f, " (RequestId: {})", request_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for RemoteError {}

/// Errors returned by this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Failure reported by the transport or the provider.
    #[error("{0}")]
    Remote(#[from] RemoteError),

    /// A numeric argument was not a positive integer.
    #[error("The params of {name} must be positive integers")]
    InvalidParam { name: &'static str },

    /// The bound endpoint does not accept this filter key.
    #[error("{key} is not a recognized filter for {action}")]
    UnrecognizedFilter { key: String, action: String },

    /// The record has no field with this name.
    #[error("instance has no attribute '{0}'")]
    UnknownField(String),

    /// Missing or malformed configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// The remote error, if this is one.
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            Error::Remote(e) => Some(e),
            _ => None,
        }
    }

    pub fn category(&self) -> Option<ErrorCategory> {
        self.remote().map(|e| e.category)
    }

    /// Provider error code, e.g. `IncorrectInstanceStatus`.
    pub fn code(&self) -> Option<&str> {
        self.remote().map(|e| e.error_code.as_str())
    }

    /// Provider message, verbatim.
    pub fn message(&self) -> Option<&str> {
        self.remote().map(|e| e.message.as_str())
    }

    /// True for argument checks that ran before any request was sent.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidParam { .. } | Error::UnrecognizedFilter { .. }
        )
    }
}
