//! Error types for Timber internals
//!
//! These errors never reach a `log_*` call site. Sinks return them to the
//! dispatcher, which reports them through `tracing` and moves on.

use thiserror::Error;

/// Errors produced while building sinks or delivering a message
#[derive(Debug, Error)]
pub enum Error {
    /// Filesystem failure (log file, logs directory, state store)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding or decoding a JSON document failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The HTTP sink was configured with an unparsable URL
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The HTTP sink was configured with an unparsable method
    #[error("invalid HTTP method '{0}'")]
    InvalidMethod(String),

    /// Building an HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The HTTP sink needs a tokio runtime to deliver requests
    #[error("no tokio runtime available for background delivery")]
    NoRuntime,
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
