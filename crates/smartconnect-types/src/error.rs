//! Error types for smartconnect.

use std::path::PathBuf;
use thiserror::Error;

use crate::Interval;

/// Result type alias for smartconnect operations.
pub type Result<T> = std::result::Result<T, SmartConnectError>;

/// Errors that can occur while talking to the SmartAPI.
#[derive(Error, Debug)]
pub enum SmartConnectError {
    /// Network, DNS, TLS or timeout failure in the transport.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Request or response body could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The server answered with `status: false`.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Candle request range rejected locally.
    #[error(transparent)]
    Range(#[from] RangeError),

    /// Authentication was required but no credentials were configured.
    #[error("No login credentials configured")]
    MissingCredentials,

    /// Token cache could not be read or written.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Network identity (local IP, public IP, MAC) could not be resolved.
    #[error("Network identity error: {0}")]
    Identity(String),

    /// The operation was cancelled by the caller.
    #[error("Operation cancelled")]
    Cancelled,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Profile probe, token refresh and login all failed.
    #[error(
        "Could not establish a session (profile: {profile}; refresh: {refresh}; login: {authenticate})"
    )]
    Bootstrap {
        /// Why the cached session was not usable.
        profile: Box<SmartConnectError>,
        /// Why the token refresh failed.
        refresh: Box<SmartConnectError>,
        /// Why the password login failed.
        authenticate: Box<SmartConnectError>,
    },
}

impl SmartConnectError {
    /// Returns true if session bootstrap may move on to its next step after
    /// this error.
    ///
    /// Envelope, serialization and validation failures are recoverable.
    /// Transport, persistence, identity and cancellation failures are not.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Api(_) | Self::Json(_) | Self::Range(_) | Self::MissingCredentials
        )
    }

    /// Returns the SmartAPI error code if this is an envelope failure.
    #[must_use]
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Api(e) => Some(&e.error_code),
            _ => None,
        }
    }
}

/// A response envelope whose `status` flag was false.
#[derive(Error, Debug, Clone, PartialEq, Eq, Default)]
#[error("status: false, message: {message}, errorcode: {error_code}")]
pub struct ApiError {
    /// Human readable message from the server.
    pub message: String,
    /// Machine error code (e.g. `AG8001`).
    pub error_code: String,
}

impl ApiError {
    /// Creates a new API error.
    #[must_use]
    pub fn new(message: impl Into<String>, error_code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_code: error_code.into(),
        }
    }
}

/// Error for candle request ranges.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    /// The range spans more days than the interval allows.
    #[error("Range of {days} days exceeds the {max_days} day limit for {interval}")]
    Exceeded {
        /// Requested interval.
        interval: Interval,
        /// Requested span, rounded up to whole days.
        days: i64,
        /// Limit for the interval.
        max_days: u32,
    },

    /// The end of the range is before its start.
    #[error("Invalid range: {from} > {to}")]
    Inverted {
        /// Start of the range.
        from: chrono::NaiveDateTime,
        /// End of the range.
        to: chrono::NaiveDateTime,
    },
}

/// Errors from the on-disk token cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Failed to read the cache file.
    #[error("Failed to read token cache '{path}': {source}")]
    ReadFile {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to write the cache file.
    #[error("Failed to write token cache '{path}': {source}")]
    WriteFile {
        /// The path that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Cache file contents were not a valid session.
    #[error("Failed to parse token cache '{path}': {source}")]
    ParseJson {
        /// The path that could not be parsed.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// Session could not be serialized.
    #[error("Failed to serialize session: {0}")]
    SerializeJson(#[source] serde_json::Error),
}
