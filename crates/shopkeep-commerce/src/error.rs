//! Commerce error types.

use shopkeep_entity::StoreError;
use shopkeep_files::FileError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur in commerce operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Persistence failure, passed through unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// File storage failure (product images).
    #[error("File storage error: {0}")]
    Files(#[from] FileError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl CommerceError {
    /// The store error underneath, if this is one.
    pub fn as_store(&self) -> Option<&StoreError> {
        match self {
            CommerceError::Store(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            CommerceError::Store(e) => e.is_not_found(),
            CommerceError::Files(e) => e.is_not_found(),
            CommerceError::Config(_) => false,
        }
    }

    pub fn is_validation(&self) -> bool {
        self.as_store().is_some_and(StoreError::is_validation)
    }

    pub fn is_duplicate(&self) -> bool {
        self.as_store().is_some_and(StoreError::is_duplicate)
    }
}

/// Result alias for commerce operations.
pub type Result<T> = std::result::Result<T, CommerceError>;
