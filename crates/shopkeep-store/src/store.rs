//! The in-memory backend.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use shopkeep_commerce::Stores;
use shopkeep_entity::{EntityId, Form, Page, Repository, StoreError};
use shopkeep_files::SharedFiles;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::error::SnapshotError;
use crate::tables::{Table, Tables};

/// Implements every entity port and checkout over one set of tables.
///
/// Reads share a read lock; writes take the write lock for the duration of
/// one operation. Multi-row operations run as transactions on a copy of the
/// tables that replaces the original only when the whole operation succeeded.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bundle this store with a file storage into the ports the commerce
    /// layer needs.
    pub fn stores(self: Arc<Self>, files: SharedFiles) -> Stores {
        Stores::from_backend(self, files)
    }

    /// Run `work` against a copy of the tables and keep the copy only if
    /// `work` succeeds.
    pub(crate) async fn transaction<T>(
        &self,
        work: impl FnOnce(&mut Tables) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut tables = self.tables.write().await;
        let mut draft = tables.clone();
        match work(&mut draft) {
            Ok(out) => {
                *tables = draft;
                Ok(out)
            }
            Err(e) => {
                debug!(error = %e, "transaction rolled back");
                Err(e)
            }
        }
    }

    pub(crate) async fn read<T>(&self, work: impl FnOnce(&Tables) -> T) -> T {
        let tables = self.tables.read().await;
        work(&tables)
    }

    /// Serialize every table, including the identifier counter.
    pub async fn to_json(&self) -> Result<String, SnapshotError> {
        let tables = self.tables.read().await;
        Ok(serde_json::to_string_pretty(&*tables)?)
    }

    /// Rebuild a store from [`MemoryStore::to_json`] output.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let tables: Tables = serde_json::from_str(json)?;
        Ok(Self {
            tables: RwLock::new(tables),
        })
    }

    /// Write a snapshot file.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let json = self.to_json().await?;
        tokio::fs::write(path.as_ref(), json).await?;
        info!("snapshot saved");
        Ok(())
    }

    /// Load a snapshot file written by [`MemoryStore::save`].
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let json = tokio::fs::read_to_string(path.as_ref()).await?;
        let store = Self::from_json(&json)?;
        info!("snapshot loaded");
        Ok(store)
    }
}

fn joined<F: Table>(row: &F, tables: &Tables) -> F {
    let mut row = row.clone();
    row.join(tables);
    row
}

#[async_trait]
impl<F: Table> Repository<F> for MemoryStore {
    async fn init(&self) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables.mark_ready(F::KIND) {
            debug!(kind = F::KIND, "table created");
        }
        Ok(())
    }

    async fn fetch(&self, id: F::Id, field: F::Field) -> Result<F, StoreError> {
        self.read(|tables| -> Result<F, StoreError> {
            tables.ensure_ready(F::KIND)?;
            let row = F::rows(tables)
                .get(&id.raw())
                .ok_or_else(|| StoreError::not_found(F::KIND, id))?;
            Ok(joined(row, tables).project(field))
        })
        .await
    }

    async fn update(&self, id: F::Id, patch: F) -> Result<F, StoreError> {
        if patch.id().is_assigned() && patch.id() != id {
            return Err(StoreError::Validation(format!(
                "{} {} cannot be updated with a patch for {}",
                F::KIND,
                id,
                patch.id()
            )));
        }
        let mut tables = self.tables.write().await;
        tables.ensure_ready(F::KIND)?;
        let mut row = F::rows(&tables)
            .get(&id.raw())
            .cloned()
            .ok_or_else(|| StoreError::not_found(F::KIND, id))?;

        let mut patch = patch;
        patch.detach();
        row.apply(&patch);
        row.detach();
        row.check(&tables)?;
        F::rows_mut(&mut tables).insert(id.raw(), row);

        let mut echo = F::with_id(id);
        echo.apply(&patch);
        echo.join(&tables);
        Ok(echo)
    }

    async fn insert(&self, form: F) -> Result<F, StoreError> {
        if form.id().is_assigned() {
            return Err(StoreError::Validation(format!(
                "{} {} already has an identifier",
                F::KIND,
                form.id()
            )));
        }
        let mut tables = self.tables.write().await;
        tables.ensure_ready(F::KIND)?;

        let id = F::Id::from_raw(tables.next_id());
        let mut row = F::with_id(id);
        row.apply(&form);
        row.settle();
        row.detach();
        row.check(&tables)?;

        tables.allocate();
        F::rows_mut(&mut tables).insert(id.raw(), row.clone());
        debug!(kind = F::KIND, %id, "row inserted");
        Ok(joined(&row, &tables))
    }

    async fn delete(&self, id: F::Id) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables.ensure_ready(F::KIND)?;
        if !F::rows(&tables).contains_key(&id.raw()) {
            return Err(StoreError::not_found(F::KIND, id));
        }
        if F::referenced(id.raw(), &tables) {
            warn!(kind = F::KIND, %id, "delete refused, row still referenced");
            return Err(StoreError::Validation(format!(
                "{} {} is still referenced",
                F::KIND,
                id
            )));
        }
        F::cascade(id.raw(), &mut tables);
        F::rows_mut(&mut tables).remove(&id.raw());
        Ok(())
    }

    async fn count(&self, parent: F::Parent) -> Result<u64, StoreError> {
        self.read(|tables| -> Result<u64, StoreError> {
            tables.ensure_ready(F::KIND)?;
            let count = F::rows(tables)
                .values()
                .filter(|row| row.owner() == Some(parent))
                .count();
            Ok(count as u64)
        })
        .await
    }

    async fn list(&self, parent: F::Parent, page: Page) -> Result<Vec<F>, StoreError> {
        self.read(|tables| -> Result<Vec<F>, StoreError> {
            tables.ensure_ready(F::KIND)?;
            let rows: Vec<F> = F::rows(tables)
                .values()
                .filter(|row| row.owner() == Some(parent))
                .map(|row| joined(row, tables))
                .collect();
            Ok(page.window(rows, |row| row.sort_key()))
        })
        .await
    }

    async fn remove_all(&self) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables.ensure_ready(F::KIND)?;
        let removed = F::rows(&tables).len();
        F::rows_mut(&mut tables).clear();
        debug!(kind = F::KIND, removed, "table emptied");
        Ok(())
    }
}
