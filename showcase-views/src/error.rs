//! Error types for showcase-views
//!
//! Client-side components never surface these to the player: every failure
//! is logged and degrades to "view not counted this time".

use thiserror::Error;

/// Main error type for showcase-views
#[derive(Error, Debug)]
pub enum Error {
    /// Errors bubbled up from the shared library (database, config, ...)
    #[error(transparent)]
    Common(#[from] showcase_common::Error),

    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Transport-level failure talking to the remote store
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote store answered with a non-success status
    #[error("Remote store error {status}: {message}")]
    Remote { status: u16, message: String },

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Store unavailable (used by the in-memory store's failure injection)
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl Error {
    /// Flatten shared-library errors so callers match on one set of kinds
    pub fn normalize(self) -> Self {
        match self {
            Error::Common(showcase_common::Error::NotFound(what)) => Error::NotFound(what),
            Error::Common(showcase_common::Error::InvalidInput(what)) => Error::InvalidInput(what),
            Error::Common(showcase_common::Error::Database(e)) => Error::Database(e),
            other => other,
        }
    }
}

/// Convenience Result type using showcase-views Error
pub type Result<T> = std::result::Result<T, Error>;
