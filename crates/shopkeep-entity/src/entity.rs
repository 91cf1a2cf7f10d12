//! Lazily-filled, lock-guarded view of one row.

use std::fmt;

use tokio::sync::RwLock;
use tracing::debug;

use crate::{EntityId, Form, SharedRepository, Slot, StoreError};

/// In-memory cache of one backing-store row.
///
/// The wrapper starts out knowing only the identifier and fills slots on
/// demand. Its form sits behind a reader/writer lock owned by this instance
/// alone. The lock covers the step from "slot unknown" to "slot known" and is
/// never held while the port is awaited.
///
/// # Coherence
///
/// Two wrappers for the same identifier are independent caches. A write made
/// through one is not visible to the other until the other fetches that slot
/// itself. Callers that need fresh data must not keep wrappers alive across
/// writes made elsewhere; build a new one instead.
///
/// Two tasks missing the same slot at once may both fetch it. The merges are
/// idempotent, so the second one is wasted work rather than a hazard.
pub struct Entity<F: Form> {
    id: F::Id,
    form: RwLock<F>,
    repository: SharedRepository<F>,
}

impl<F: Form> Entity<F> {
    /// A wrapper that knows nothing but its identifier. Performs no I/O.
    pub fn new(id: F::Id, repository: SharedRepository<F>) -> Self {
        Self {
            id,
            form: RwLock::new(F::with_id(id)),
            repository,
        }
    }

    /// A wrapper pre-filled with an already fetched form.
    pub fn hydrated(form: F, repository: SharedRepository<F>) -> Self {
        Self {
            id: form.id(),
            form: RwLock::new(form),
            repository,
        }
    }

    /// The row identifier. Never locks and never performs I/O.
    pub fn id(&self) -> F::Id {
        self.id
    }

    pub fn repository(&self) -> &SharedRepository<F> {
        &self.repository
    }

    /// A copy of everything cached so far.
    pub async fn snapshot(&self) -> F {
        self.form.read().await.clone()
    }

    /// Merge a form into the cache.
    pub async fn apply(&self, patch: &F) {
        self.form.write().await.apply(patch);
    }

    /// Check if the slot for `field` is cached.
    pub async fn is_cached(&self, field: F::Field) -> bool {
        self.form.read().await.is_known(field)
    }

    /// Drop one cached slot so the next read goes back to the store.
    pub async fn invalidate(&self, field: F::Field) {
        self.form.write().await.forget(field);
    }

    /// Read one slot, fetching it on a miss.
    ///
    /// Returns `None` when the store holds no value. Port errors propagate
    /// unchanged and leave the cache as it was.
    pub async fn get<T: Clone>(
        &self,
        field: F::Field,
        slot: fn(&F) -> &Slot<T>,
    ) -> Result<Option<T>, StoreError> {
        {
            let form = self.form.read().await;
            if let Some(value) = slot(&form).known() {
                return Ok(value.cloned());
            }
        }

        debug!(kind = F::KIND, id = %self.id, ?field, "cache miss");
        let fetched = self.repository.fetch(self.id, field).await?;

        if fetched.id().is_assigned() && fetched.id() != self.id {
            return Err(StoreError::Transient(format!(
                "{} {}: fetch returned row {}",
                F::KIND,
                self.id,
                fetched.id()
            )));
        }
        let value = match slot(&fetched) {
            Slot::Unknown => {
                return Err(StoreError::Transient(format!(
                    "{} {}: fetch of {:?} returned no value",
                    F::KIND,
                    self.id,
                    field
                )))
            }
            Slot::Null => None,
            Slot::Value(v) => Some(v.clone()),
        };

        self.form.write().await.apply(&fetched);
        Ok(value)
    }

    /// Read a slot that the store never leaves null.
    pub async fn require<T: Clone>(
        &self,
        field: F::Field,
        slot: fn(&F) -> &Slot<T>,
    ) -> Result<T, StoreError> {
        self.get(field, slot).await?.ok_or_else(|| {
            StoreError::Transient(format!("{} {}: {:?} is null", F::KIND, self.id, field))
        })
    }

    /// Write through the port, then merge what it echoed.
    ///
    /// Nothing is cached if the write fails.
    pub async fn set(&self, patch: F) -> Result<(), StoreError> {
        let echoed = self.repository.update(self.id, patch).await?;
        debug!(kind = F::KIND, id = %self.id, "merging write echo");
        self.form.write().await.apply(&echoed);
        Ok(())
    }

    /// Delete the row. The wrapper keeps its (now stale) cache.
    pub async fn delete(&self) -> Result<(), StoreError> {
        self.repository.delete(self.id).await
    }
}

impl<F: Form> fmt::Debug for Entity<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("kind", &F::KIND)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use super::*;
    use crate::test_support::{MockRepository, WidgetField, WidgetForm, WidgetId};

    fn seeded() -> Arc<MockRepository<WidgetForm>> {
        let repo = Arc::new(MockRepository::new());
        let mut row = WidgetForm::with_id(WidgetId::new(1));
        row.name = Slot::Value("bolt".to_string());
        row.note = Slot::Null;
        repo.seed(row);
        repo
    }

    fn wrap(repo: &Arc<MockRepository<WidgetForm>>) -> Entity<WidgetForm> {
        Entity::<WidgetForm>::new(WidgetId::new(1), repo.clone())
    }

    #[tokio::test]
    async fn test_id_needs_no_fetch() {
        let repo = seeded();
        let entity = wrap(&repo);
        assert_eq!(entity.id(), WidgetId::new(1));
        assert_eq!(repo.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_fetches_once_per_miss() {
        let repo = seeded();
        let entity = wrap(&repo);

        let first = entity.require(WidgetField::Name, |f| &f.name).await.unwrap();
        let second = entity.require(WidgetField::Name, |f| &f.name).await.unwrap();

        assert_eq!(first, "bolt");
        assert_eq!(second, "bolt");
        assert_eq!(repo.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_null_is_cached() {
        let repo = seeded();
        let entity = wrap(&repo);

        assert_eq!(entity.get(WidgetField::Note, |f| &f.note).await.unwrap(), None);
        assert_eq!(entity.get(WidgetField::Note, |f| &f.note).await.unwrap(), None);
        assert_eq!(repo.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_require_rejects_null() {
        let repo = seeded();
        let entity = wrap(&repo);
        let err = entity.require(WidgetField::Note, |f| &f.note).await.unwrap_err();
        assert!(matches!(err, StoreError::Transient(_)));
    }

    #[tokio::test]
    async fn test_set_merges_echo_without_fetch() {
        let repo = seeded();
        let entity = wrap(&repo);

        let mut patch = WidgetForm::default();
        patch.name = Slot::Value("nut".to_string());
        entity.set(patch).await.unwrap();

        let name = entity.require(WidgetField::Name, |f| &f.name).await.unwrap();
        assert_eq!(name, "nut");
        assert_eq!(repo.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_cache_unchanged() {
        let repo = seeded();
        let entity = wrap(&repo);
        let before = entity.snapshot().await;

        repo.fail_fetches.store(true, Ordering::SeqCst);
        let err = entity.get(WidgetField::Name, |f| &f.name).await.unwrap_err();

        assert!(matches!(err, StoreError::Transient(_)));
        assert_eq!(entity.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_failed_set_caches_nothing() {
        let repo = seeded();
        let entity = Entity::<WidgetForm>::new(WidgetId::new(404), repo.clone());

        let mut patch = WidgetForm::default();
        patch.name = Slot::Value("ghost".to_string());
        let err = entity.set(patch).await.unwrap_err();

        assert!(err.is_not_found());
        assert!(!entity.is_cached(WidgetField::Name).await);
    }

    #[tokio::test]
    async fn test_not_found_propagates() {
        let repo = seeded();
        let entity = Entity::<WidgetForm>::new(WidgetId::new(404), repo.clone());
        let err = entity.get(WidgetField::Name, |f| &f.name).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_instances_do_not_share_writes() {
        let repo = seeded();
        let a = wrap(&repo);
        let b = wrap(&repo);

        // b caches the old value before a writes.
        let old = b.require(WidgetField::Name, |f| &f.name).await.unwrap();

        let mut patch = WidgetForm::default();
        patch.name = Slot::Value("x".to_string());
        a.set(patch).await.unwrap();

        let seen_by_b = b.require(WidgetField::Name, |f| &f.name).await.unwrap();
        assert_eq!(old, "bolt");
        assert_eq!(seen_by_b, "bolt");

        // A wrapper built after the write sees it through its own fetch.
        let c = wrap(&repo);
        let fresh = c.require(WidgetField::Name, |f| &f.name).await.unwrap();
        assert_eq!(fresh, "x");
    }

    #[tokio::test]
    async fn test_unfetched_instance_sees_write_through_own_fetch() {
        let repo = seeded();
        let a = wrap(&repo);
        let b = wrap(&repo);
        assert!(!b.is_cached(WidgetField::Name).await);

        let mut patch = WidgetForm::default();
        patch.name = Slot::Value("x".to_string());
        a.set(patch).await.unwrap();
        assert!(!b.is_cached(WidgetField::Name).await);

        let fetches = repo.fetch_count();
        let seen_by_b = b.require(WidgetField::Name, |f| &f.name).await.unwrap();
        assert_eq!(seen_by_b, "x");
        assert_eq!(repo.fetch_count(), fetches + 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let repo = seeded();
        let entity = wrap(&repo);

        entity.require(WidgetField::Name, |f| &f.name).await.unwrap();
        entity.invalidate(WidgetField::Name).await;
        entity.require(WidgetField::Name, |f| &f.name).await.unwrap();

        assert_eq!(repo.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_apply_twice_equals_once() {
        let repo = seeded();
        let entity = wrap(&repo);

        let mut patch = WidgetForm::with_id(WidgetId::new(1));
        patch.name = Slot::Value("gear".to_string());
        entity.apply(&patch).await;
        let once = entity.snapshot().await;
        entity.apply(&patch).await;

        assert_eq!(entity.snapshot().await, once);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_readers_agree() {
        let repo = seeded();
        let entity = Arc::new(wrap(&repo));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let entity = entity.clone();
            handles.push(tokio::spawn(async move {
                entity.require(WidgetField::Name, |f| &f.name).await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "bolt");
        }
        // Racing misses may each fetch, but never more than once per task.
        assert!(repo.fetch_count() >= 1 && repo.fetch_count() <= 8);
    }
}
