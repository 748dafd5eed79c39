//! Error types for lead-outreach
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (Config, Validation, Directory)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for lead-outreach operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for lead-outreach
///
/// Only fatal conditions travel through this type. Failures that concern a
/// single candidate are recorded in the run result instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "oracle.api_key")
        key: Option<String>,
    },

    /// Request failed validation
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationErrors),

    /// Lead directory call made on behalf of an API client failed
    #[error("lead directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// Another run is already active on this runner
    #[error("an outreach run is already in progress")]
    RunInProgress,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),
}

impl Error {
    /// Build a configuration error pointing at a specific key
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Wire name of the offending field (e.g., "totalLeads")
    pub field: String,
    /// What is wrong with it
    pub message: String,
}

/// All validation failures found in a run request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    /// Individual failures, in field declaration order
    pub fields: Vec<FieldError>,
}

impl ValidationErrors {
    /// Record a failure for `field`
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// True when no failures were recorded
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Messages joined with ", "
    pub fn joined(&self) -> String {
        self.fields
            .iter()
            .map(|f| f.message.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Ok(()) when empty, Err(self) otherwise
    pub fn into_result(self) -> std::result::Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.joined())
    }
}

impl std::error::Error for ValidationErrors {}

/// Errors raised by a lead directory implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// Upstream rejected the session (HTTP 401)
    #[error("unauthorized by lead directory")]
    Unauthorized,

    /// Upstream refused the action (HTTP 403)
    #[error("forbidden by lead directory")]
    Forbidden,

    /// Upstream is throttling us (HTTP 429)
    #[error("rate limited by lead directory")]
    RateLimited,

    /// Any other non-success upstream status
    #[error("lead directory returned status {status}: {message}")]
    Upstream {
        /// HTTP status code returned by the directory
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// Request never completed (connect, timeout, reset)
    #[error("lead directory transport failure: {0}")]
    Transport(String),

    /// Response body could not be decoded
    #[error("failed to decode lead directory response: {0}")]
    Decode(String),

    /// The directory does not implement this action
    #[error("operation not supported by this lead directory")]
    Unsupported,
}

impl DirectoryError {
    /// Map an upstream HTTP status to the matching variant
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 => DirectoryError::Unauthorized,
            403 => DirectoryError::Forbidden,
            429 => DirectoryError::RateLimited,
            _ => DirectoryError::Upstream {
                status,
                message: message.into(),
            },
        }
    }
}

/// Errors raised by a qualification oracle implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// No API key configured
    #[error("qualification oracle credentials are not configured")]
    MissingCredentials,

    /// Request never completed
    #[error("qualification oracle transport failure: {0}")]
    Transport(String),

    /// Non-success status from the oracle
    #[error("qualification oracle returned status {status}: {message}")]
    Upstream {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Oracle answered with something that is not a verdict
    #[error("failed to parse qualification verdict: {0}")]
    Parse(String),
}

/// API error response format
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "validation_error",
///     "message": "Total leads must be at least 1",
///     "details": { "fields": [{ "field": "totalLeads", "message": "Total leads must be at least 1" }] }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "validation_error")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - malformed run request
            Error::Validation(_) => 400,

            // 409 Conflict - runner busy
            Error::RunInProgress => 409,

            // 500 Internal Server Error - server-side issues
            Error::Config { .. } => 500,
            Error::Io(_) => 500,
            Error::ApiServerError(_) => 500,

            // Directory client errors are passed through to the caller
            Error::Directory(e) => match e {
                DirectoryError::Unauthorized => 401,
                DirectoryError::Forbidden => 403,
                DirectoryError::RateLimited => 429,
                DirectoryError::Upstream { status, .. } if (400..500).contains(status) => *status,
                DirectoryError::Unsupported => 501,
                DirectoryError::Upstream { .. }
                | DirectoryError::Transport(_)
                | DirectoryError::Decode(_) => 502,
            },

            // 502 Bad Gateway - external service errors
            Error::Network(_) => 502,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Validation(_) => "validation_error",
            Error::Directory(e) => match e {
                DirectoryError::Unauthorized => "directory_unauthorized",
                DirectoryError::Forbidden => "directory_forbidden",
                DirectoryError::RateLimited => "directory_rate_limited",
                DirectoryError::Upstream { .. } => "directory_upstream_error",
                DirectoryError::Transport(_) => "directory_transport_error",
                DirectoryError::Decode(_) => "directory_decode_error",
                DirectoryError::Unsupported => "directory_unsupported",
            },
            Error::RunInProgress => "run_in_progress",
            Error::Io(_) => "io_error",
            Error::Network(_) => "network_error",
            Error::ApiServerError(_) => "api_server_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Validation(v) => Some(serde_json::json!({ "fields": v.fields })),
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({ "key": key })),
            Error::Directory(DirectoryError::Upstream { status, .. }) => {
                Some(serde_json::json!({ "upstream_status": status }))
            }
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
