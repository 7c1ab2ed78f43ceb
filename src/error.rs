//! Error types for the chat server
//!
//! Defines application-level errors. Uses thiserror for ergonomic
//! error definitions.

use thiserror::Error;

/// Application-level errors
///
/// All errors are local to one session or one startup step: an I/O or
/// framing failure drops the affected session but never the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// IO error on a read, write, accept or bind
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Decoded frame header exceeds the maximum body length
    #[error("frame header declares {0} bytes, exceeding the maximum body length")]
    HeaderOverflow(usize),

    /// Command-line port argument that is not a valid port number
    #[error("invalid port: '{0}'")]
    InvalidPort(String),
}
