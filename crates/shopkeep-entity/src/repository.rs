//! The persistence port.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{Form, Page, StoreError};

/// Storage-facing contract for one entity kind.
///
/// Implementations answer with forms: a fetch fills at least the requested
/// slot and may fill others it got for free (for example a joined row behind
/// a reference). Every method is a suspension point; callers hold no lock
/// while awaiting it.
#[async_trait]
pub trait Repository<F: Form>: Send + Sync {
    /// Idempotent schema bootstrap.
    async fn init(&self) -> Result<(), StoreError>;

    /// Fetch the slot for `field` of one row.
    async fn fetch(&self, id: F::Id, field: F::Field) -> Result<F, StoreError>;

    /// Write every known slot of `patch` and echo what was stored.
    async fn update(&self, id: F::Id, patch: F) -> Result<F, StoreError>;

    /// Insert a new row, assigning its identifier.
    async fn insert(&self, form: F) -> Result<F, StoreError>;

    async fn delete(&self, id: F::Id) -> Result<(), StoreError>;

    /// Count rows under `parent`.
    async fn count(&self, parent: F::Parent) -> Result<u64, StoreError>;

    /// One page of rows under `parent`, as populated as the query allows.
    async fn list(&self, parent: F::Parent, page: Page) -> Result<Vec<F>, StoreError>;

    async fn remove_all(&self) -> Result<(), StoreError>;
}

/// Shared handle to a port.
pub type SharedRepository<F> = Arc<dyn Repository<F>>;
