//! File storage error types.

use thiserror::Error;

/// Errors that can occur when using file storage.
#[derive(Error, Debug)]
pub enum FileError {
    /// No file stored under the token.
    #[error("File not found: {0}")]
    NotFound(String),

    /// The token is empty, absolute, or escapes the storage root.
    #[error("Invalid file token: {0}")]
    InvalidToken(String),

    /// Underlying I/O failure.
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FileError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FileError::NotFound(_))
    }
}
