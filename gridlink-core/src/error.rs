//! Error types for gridlink operations.

use std::io;
use thiserror::Error;

/// The main error type for gridlink operations.
#[derive(Debug, Error)]
pub enum GridError {
    /// Connection-related errors (network failures, disconnections, client shutdown).
    #[error("connection error: {0}")]
    Connection(String),

    /// Protocol-related errors (malformed messages, dispatch mismatches).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Routing errors (partition out of range, no known owner).
    #[error("routing error: {0}")]
    Routing(String),

    /// Invalid arguments rejected before any network interaction.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation timeout errors.
    #[error("timeout error: {0}")]
    Timeout(String),

    /// I/O errors from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A specialized `Result` type for gridlink operations.
pub type Result<T> = std::result::Result<T, GridError>;
