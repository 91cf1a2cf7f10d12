//! Store error taxonomy.

use std::fmt;

use thiserror::Error;

/// Errors reported by a persistence port.
///
/// Every layer above the port passes these through unchanged. Nothing in this
/// crate retries or suppresses them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No matching row.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique constraint violation.
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Any other store failure, including aborted transactions.
    #[error("Store error: {0}")]
    Transient(String),

    /// The caller supplied an invalid or unassigned reference.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl StoreError {
    /// A `NotFound` for one row of an entity kind.
    pub fn not_found(kind: &str, id: impl fmt::Display) -> Self {
        StoreError::NotFound(format!("{} {}", kind, id))
    }

    /// A `Validation` error for an identifier that was never assigned.
    pub fn unassigned(what: &str) -> Self {
        StoreError::Validation(format!("{} is not assigned", what))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::Duplicate(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }
}
