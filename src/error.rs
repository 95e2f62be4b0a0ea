//! Error types for the quiver library.
//!
//! All fallible operations return [`Result`], whose error type is the
//! [`QuiverError`] enum. The three variants that matter to callers of the
//! fusion pipeline are [`QuiverError::Generation`],
//! [`QuiverError::Retrieval`], and [`QuiverError::Timeout`]; the remaining
//! variants cover configuration and I/O plumbing.
//!
//! # Examples
//!
//! ```
//! use quiver::error::{QuiverError, Result};
//!
//! fn check_top_k(top_k: usize) -> Result<()> {
//!     if top_k == 0 {
//!         return Err(QuiverError::invalid_config("top_k must be at least 1"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_top_k(0).is_err());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for quiver operations.
#[derive(Error, Debug)]
pub enum QuiverError {
    /// Text-generation collaborator was unreachable or returned unusable output.
    #[error("Generation error: {0}")]
    Generation(String),

    /// Retrieval collaborator was unreachable or returned a malformed response.
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Re-ranking collaborator failed.
    #[error("Rerank error: {0}")]
    Rerank(String),

    /// A caller-supplied deadline elapsed with calls still in flight.
    #[error("Timeout exceeded: {0}")]
    Timeout(String),

    /// Invalid engine or stage configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid argument passed to an operation.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O errors (corpus files, sockets, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with QuiverError.
pub type Result<T> = std::result::Result<T, QuiverError>;

impl QuiverError {
    /// Create a new generation error.
    pub fn generation<S: Into<String>>(msg: S) -> Self {
        QuiverError::Generation(msg.into())
    }

    /// Create a new retrieval error.
    pub fn retrieval<S: Into<String>>(msg: S) -> Self {
        QuiverError::Retrieval(msg.into())
    }

    /// Create a new rerank error.
    pub fn rerank<S: Into<String>>(msg: S) -> Self {
        QuiverError::Rerank(msg.into())
    }

    /// Create a new timeout error.
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        QuiverError::Timeout(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        QuiverError::InvalidConfig(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        QuiverError::InvalidArgument(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        QuiverError::Other(msg.into())
    }

    /// True when this error is fatal to a request regardless of where it
    /// occurred (deadline expiry is never recovered locally).
    pub fn is_timeout(&self) -> bool {
        matches!(self, QuiverError::Timeout(_))
    }
}
