//! Error types for the tempmail-verify crate.
//!
//! All errors implement [`std::error::Error`] and provide context about what went wrong.
//! Errors are categorized by their retryability - see [`Error::is_retryable`].

use std::time::Duration;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the mailbox provider.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // Configuration / validation errors (NOT retryable)
    // ─────────────────────────────────────────────────────────────────────────
    /// Invalid email address format.
    #[error("invalid email format: {email}")]
    InvalidEmailFormat {
        /// The invalid email address.
        email: String,
    },

    /// Invalid configuration provided.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// The provider base URL could not be parsed.
    #[error("invalid base URL '{url}'")]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client")]
    HttpClient {
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Network errors (RETRYABLE)
    // ─────────────────────────────────────────────────────────────────────────
    /// The HTTP request could not be completed.
    #[error("request to {endpoint} failed")]
    Request {
        /// The endpoint that was called.
        endpoint: String,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Timeout errors (mixed retryability)
    // ─────────────────────────────────────────────────────────────────────────
    /// The HTTP request did not complete in time.
    #[error("request to {endpoint} timed out after {timeout:?}")]
    RequestTimeout {
        /// The endpoint that was called.
        endpoint: String,
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// Timeout waiting for a verification code to arrive.
    #[error("timeout waiting for verification code after {timeout:?}")]
    WaitTimeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Provider protocol errors (RETRYABLE)
    // ─────────────────────────────────────────────────────────────────────────
    /// The provider answered with a non-success status.
    #[error("{endpoint} returned HTTP {status}")]
    HttpStatus {
        /// The endpoint that was called.
        endpoint: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The provider answered with a body that is not the expected JSON.
    #[error("failed to decode response from {endpoint}")]
    Decode {
        /// The endpoint that was called.
        endpoint: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Search result errors (NOT retryable)
    // ─────────────────────────────────────────────────────────────────────────
    /// The mailbox holds no mail with a verification code.
    #[error("no verification code found")]
    NoMatch,

    /// Every attempt of the retry loop failed.
    #[error("failed to get verification code after {attempts} attempts")]
    RetriesExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// The error of the last attempt.
        #[source]
        last: Box<Error>,
    },
}

impl Error {
    /// Returns `true` if this error represents a transient failure that might succeed on retry.
    ///
    /// Use this to implement retry logic:
    ///
    /// ```ignore
    /// if error.is_retryable() {
    ///     // Sleep and retry
    /// } else {
    ///     // Fail permanently
    /// }
    /// ```
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            // Any provider status, 4xx included, may clear on the next attempt
            Error::Request { .. }
            | Error::RequestTimeout { .. }
            | Error::HttpStatus { .. }
            | Error::Decode { .. } => true,

            Error::InvalidEmailFormat { .. }
            | Error::InvalidConfig { .. }
            | Error::InvalidBaseUrl { .. }
            | Error::HttpClient { .. }
            | Error::WaitTimeout { .. }
            | Error::NoMatch
            | Error::RetriesExhausted { .. } => false,
        }
    }

    /// Returns the error category for metrics/logging purposes.
    ///
    /// [`Error::RetriesExhausted`] reports the category of the last failure.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidEmailFormat { .. }
            | Error::InvalidConfig { .. }
            | Error::InvalidBaseUrl { .. }
            | Error::HttpClient { .. } => ErrorCategory::Configuration,

            Error::Request { .. } => ErrorCategory::Network,

            Error::RequestTimeout { .. } | Error::WaitTimeout { .. } => ErrorCategory::Timeout,

            Error::HttpStatus { .. } => ErrorCategory::Protocol,

            Error::Decode { .. } => ErrorCategory::Parse,

            Error::NoMatch => ErrorCategory::NotFound,

            Error::RetriesExhausted { last, .. } => last.category(),
        }
    }
}

/// Error categories for metrics and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Configuration or validation errors.
    Configuration,
    /// Network connectivity errors.
    Network,
    /// Timeout errors.
    Timeout,
    /// Unexpected HTTP status from the provider.
    Protocol,
    /// Response decoding errors.
    Parse,
    /// No verification code found.
    NotFound,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Network => write!(f, "network"),
            ErrorCategory::Timeout => write!(f, "timeout"),
            ErrorCategory::Protocol => write!(f, "protocol"),
            ErrorCategory::Parse => write!(f, "parse"),
            ErrorCategory::NotFound => write!(f, "not_found"),
        }
    }
}
