//! Error types for the govsearch application.

use govsearch_hybrid::ClientError;

/// Top-level error type for the search front-end.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Search/chat service error.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AppError>;
