//! Error types for the Quantum Archives client.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.
//! None of these errors reach the user directly: the adapters convert them into
//! benign, displayable results.

use std::time::Duration;

/// Errors from the HTTP client layer.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limited by the generative API (429 response)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait time before retry
        retry_after: Duration,
    },

    /// Missing or rejected API key (401/403 response)
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Error message from API
        message: String,
    },

    /// Model or endpoint not found (404 response)
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Description of the missing resource
        resource: String,
    },

    /// Invalid request (400 response)
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message from API
        message: String,
    },

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },
}

impl ClientError {
    /// Create a rate limited error with retry-after duration.
    #[must_use]
    pub fn rate_limited(seconds: u64) -> Self {
        Self::RateLimited { retry_after: Duration::from_secs(seconds) }
    }

    /// Create an unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized { message: message.into() }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into() }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    /// Returns true if a later attempt could succeed.
    ///
    /// Classification only; nothing in this crate retries.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Server { .. })
    }

    /// Get the retry-after duration if this is a rate limit error.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

/// Validation failures for a structured discovery payload.
#[derive(thiserror::Error, Debug)]
pub enum PayloadError {
    /// Payload is not valid JSON.
    #[error("Payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Top-level value is not an array.
    #[error("Expected a JSON array, found {found}")]
    NotAnArray {
        /// JSON type that was found instead
        found: &'static str,
    },

    /// Array element is not an object.
    #[error("Item {index} is not an object")]
    NotAnObject {
        /// Position in the array
        index: usize,
    },

    /// Required field is absent.
    #[error("Item {index} is missing required field '{field}'")]
    MissingField {
        /// Position in the array
        index: usize,
        /// Field name
        field: &'static str,
    },

    /// Field is present with the wrong type.
    #[error("Item {index} field '{field}' must be {expected}")]
    WrongType {
        /// Position in the array
        index: usize,
        /// Field name
        field: &'static str,
        /// Human-readable expected type
        expected: &'static str,
    },
}

/// Errors from the discovery and chat adapters.
///
/// Only surfaced by the `try_*` entry points; the public adapter calls
/// degrade these into empty lists or fallback messages.
#[derive(thiserror::Error, Debug)]
pub enum AdapterError {
    /// Error from the API client
    #[error("API error: {0}")]
    Client(#[from] ClientError),

    /// Structured payload failed validation
    #[error("Invalid payload: {0}")]
    Payload(#[from] PayloadError),

    /// Model returned no text at all
    #[error("Model returned an empty response")]
    EmptyResponse,
}

/// Errors from the session handle.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    /// Controller task has stopped.
    #[error("Session controller is no longer running")]
    Closed,

    /// Paper id not present in the discovered or collected set.
    #[error("Unknown paper: {0}")]
    UnknownPaper(String),

    /// Name does not match any selectable physicist.
    #[error("Unknown physicist: {0}")]
    UnknownPhysicist(String),
}

impl SessionError {
    /// Convert to a user-friendly message for the shell and HTTP front-ends.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::UnknownPaper(id) => {
                format!("No paper with id '{id}'. List papers first and use one of the shown ids.")
            }
            Self::UnknownPhysicist(name) => {
                format!("'{name}' is not one of Heisenberg, Pauli, Schrödinger or Dirac.")
            }
            Self::Closed => self.to_string(),
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for adapter operations.
pub type AdapterResult<T> = Result<T, AdapterError>;
