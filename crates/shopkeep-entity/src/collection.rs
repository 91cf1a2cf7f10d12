//! Stateless constructor and lister for one entity kind.

use std::sync::Arc;

use tracing::{debug, info};

use crate::{Entity, EntityId, Form, Page, SharedRepository, StoreError};

/// Builds wrappers for one entity kind.
///
/// A collection holds nothing but its port. It never caches entities: every
/// call hands out fresh wrappers.
pub struct Collection<F: Form> {
    repository: SharedRepository<F>,
}

impl<F: Form> Clone for Collection<F> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<F: Form> Collection<F> {
    pub fn new(repository: SharedRepository<F>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &SharedRepository<F> {
        &self.repository
    }

    /// Run the port's schema bootstrap.
    pub async fn init(&self) -> Result<(), StoreError> {
        self.repository.init().await?;
        debug!(kind = F::KIND, "initialized");
        Ok(())
    }

    pub async fn count(&self, parent: F::Parent) -> Result<u64, StoreError> {
        self.repository.count(parent).await
    }

    /// List one page with a single query.
    ///
    /// Each wrapper comes back pre-filled with everything the query returned,
    /// so reading those slots costs no further round trips.
    pub async fn list(&self, parent: F::Parent, page: Page) -> Result<Vec<Entity<F>>, StoreError> {
        let forms = self.repository.list(parent, page).await?;
        debug!(kind = F::KIND, rows = forms.len(), ?page, "listed");
        forms
            .into_iter()
            .map(|form| {
                if !form.id().is_assigned() {
                    return Err(StoreError::Transient(format!(
                        "{} listing returned a row without identifier",
                        F::KIND
                    )));
                }
                Ok(Entity::hydrated(form, Arc::clone(&self.repository)))
            })
            .collect()
    }

    /// A fresh wrapper for `id`. Performs no I/O, so a missing row only
    /// surfaces on first read.
    pub fn get(&self, id: F::Id) -> Entity<F> {
        Entity::new(id, Arc::clone(&self.repository))
    }

    /// Insert a row and return a wrapper hydrated with what the store echoed.
    pub async fn insert(&self, form: F) -> Result<Entity<F>, StoreError> {
        if form.id().is_assigned() {
            return Err(StoreError::Validation(format!(
                "new {} must not carry an identifier (got {})",
                F::KIND,
                form.id()
            )));
        }
        let stored = self.repository.insert(form).await?;
        info!(kind = F::KIND, id = %stored.id(), "inserted");
        Ok(Entity::hydrated(stored, Arc::clone(&self.repository)))
    }

    pub async fn remove_all(&self) -> Result<(), StoreError> {
        self.repository.remove_all().await?;
        info!(kind = F::KIND, "removed all rows");
        Ok(())
    }
}
