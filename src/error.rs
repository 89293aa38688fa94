//! Error types for videogen-dl
//!
//! This module provides the error handling for the library:
//! - Per-prompt errors (API status, generation failure, timeout, transport, fetch)
//! - Run-level errors (output directory, manifest serialization, configuration)

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for videogen-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for videogen-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "VIDEOGEN_API_URL")
        key: Option<String>,
    },

    /// The generation service answered a submit request with a non-success status
    #[error("API error: {status}")]
    Api {
        /// HTTP status code returned by the service
        status: u16,
    },

    /// The service reported the generation job as failed
    #[error("generation failed: {message}")]
    GenerationFailed {
        /// Service-supplied failure message
        message: String,
    },

    /// The poll budget ran out while the job was still pending
    #[error("video generation timed out: job {job_id} pending after {attempts} status checks")]
    Timeout {
        /// Job (prediction) identifier that was being polled
        job_id: String,
        /// Number of status checks performed
        attempts: u32,
    },

    /// Network-level failure on any HTTP call
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Failure while streaming an artifact to disk
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Redirect chain exceeded the configured hop limit
    #[error("too many redirects (limit {limit}) while fetching {url}")]
    TooManyRedirects {
        /// Maximum number of redirects that may be followed
        limit: u32,
        /// URL that answered with the redirect beyond the limit
        url: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Artifact fetch errors
#[derive(Debug, Error)]
pub enum FetchError {
    /// The media URL answered with a status that is neither success nor redirect
    #[error("HTTP {status} fetching {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// URL being fetched
        url: String,
    },

    /// A redirect response carried no usable Location header
    #[error("redirect from {url} has no Location header")]
    MissingLocation {
        /// URL that answered with the redirect
        url: String,
    },

    /// A URL (initial or redirect target) could not be parsed
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl {
        /// The offending URL text
        url: String,
        /// Parser message
        reason: String,
    },

    /// Writing the destination file failed
    #[error("failed to write {path}: {source}")]
    Io {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a configuration error tied to a specific key
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}
