//! Common error types for the playlist service

use thiserror::Error;

/// Common result type for playlist operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the store and the HTTP layer
#[derive(Error, Debug)]
pub enum Error {
    /// A required query parameter was missing or empty
    #[error("Please provide a title parameter")]
    EmptyQuery,

    /// A query matched zero rows
    #[error("{0}")]
    NotFound(String),

    /// Rating outside 1..=5 or not an integer
    #[error("{0}")]
    InvalidRating(String),

    /// Source JSON could not be parsed or is not a table of flat records
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
