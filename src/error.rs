//! Custom error types for mangafinder.
//!
//! All fallible library functions return `Result<T, FinderError>` instead of using `unwrap()`.

use thiserror::Error;

/// Main error type for mangafinder operations.
#[derive(Debug, Error)]
pub enum FinderError {
    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Provider payload could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),

    /// External API returned an error
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code returned by the provider
        code: i32,
        /// Error message from API
        message: String,
    },

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error (missing API key, bad base URL, ...)
    #[error("Config error: {0}")]
    Config(String),

    /// Rejected client input
    #[error("{0}")]
    Validation(String),

    /// Translation provider failure
    #[error("Translation error: {0}")]
    Translation(String),

    /// Request exceeded its time budget
    #[error("Timed out after {0}s")]
    Timeout(u64),
}

impl FinderError {
    /// Whether this error was caused by the caller's input rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, FinderError::Validation(_))
    }
}

/// Result type alias using `FinderError`
pub type Result<T> = std::result::Result<T, FinderError>;
