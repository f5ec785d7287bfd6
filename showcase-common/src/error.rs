//! Error type shared by the showcase crates
//!
//! Store-level failures keep their kind (`NotFound`, `InvalidInput`) so the
//! HTTP layer can map them to 404/400 without inspecting messages.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// SQLite failure, including a writer that gave up after `busy_timeout`
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Root folder or config file could not be read or created
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or inconsistent `showcase.toml`
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Rejected view fact or catalog entry
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// No catalog entry with this id
    pub fn video_not_found(video_id: &str) -> Self {
        Error::NotFound(format!("video {}", video_id))
    }
}
