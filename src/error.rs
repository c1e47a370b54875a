// src/error.rs

//! Unified error handling for the ingest application.

use std::fmt;

use thiserror::Error;

/// Result type alias for ingest operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Root document could not be fetched or parsed. Always fatal.
    #[error("Root fetch error for {location}: {message}")]
    RootFetch { location: String, message: String },

    /// A single document could not be fetched. Recoverable per node.
    #[error("Fetch error for {location}: {message}")]
    Fetch { location: String, message: String },

    /// A fetched document could not be parsed. Recoverable per node.
    #[error("Parse error for {location}: {message}")]
    Parse { location: String, message: String },

    /// Bulk-write retries exhausted or a non-retryable sink failure.
    #[error("Sink failed after {attempts} attempt(s): {message}")]
    SinkExhausted { attempts: u32, message: String },

    /// The downstream pipeline stopped accepting documents.
    #[error("Pipeline stream closed: {0}")]
    StreamClosed(String),

    /// Search index collaborator error
    #[error("Search index error: {0}")]
    Index(String),

    /// AWS S3 error
    #[error("S3 error: {0}")]
    S3(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a fatal root-fetch error.
    pub fn root_fetch(location: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::RootFetch {
            location: location.into(),
            message: message.to_string(),
        }
    }

    /// Create a per-node fetch error.
    pub fn fetch(location: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            location: location.into(),
            message: message.to_string(),
        }
    }

    /// Create a per-node parse error.
    pub fn parse(location: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Parse {
            location: location.into(),
            message: message.to_string(),
        }
    }

    /// Create a fatal sink error after the given number of attempts.
    pub fn sink_exhausted(attempts: u32, message: impl fmt::Display) -> Self {
        Self::SinkExhausted {
            attempts,
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether this error aborts the whole pipeline.
    ///
    /// Per-node fetch/parse errors only remove their own subtree from the
    /// results; everything else propagates to the overall outcome.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Fetch { .. } | Self::Parse { .. })
    }
}
