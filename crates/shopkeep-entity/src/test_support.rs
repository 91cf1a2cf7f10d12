//! Test forms and a counting in-memory port.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{define_form, define_id, EntityId, Form, Page, Repository, StoreError};

define_id!(WidgetId);
define_id!(GadgetId);

define_form! {
    pub struct GadgetForm: "gadget" {
        id: GadgetId,
        parent: (),
        field: GadgetField,
        label: String => Label,
    }
    links {}
}

define_form! {
    pub struct WidgetForm: "widget" {
        id: WidgetId,
        parent: (),
        field: WidgetField,
        name: String => Name,
        note: String => Note,
    }
    links {
        gadget: GadgetForm => Gadget,
    }
}

/// Port over a map that counts every call.
pub struct MockRepository<F: Form> {
    rows: Mutex<BTreeMap<u64, F>>,
    next_id: AtomicU64,
    pub fetches: AtomicUsize,
    pub updates: AtomicUsize,
    pub fail_fetches: AtomicBool,
}

impl<F: Form> MockRepository<F> {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            fetches: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
            fail_fetches: AtomicBool::new(false),
        }
    }

    /// Store a fully-populated row.
    pub fn seed(&self, form: F) {
        let mut rows = self.rows.lock().unwrap();
        self.next_id
            .fetch_max(form.id().raw() + 1, Ordering::SeqCst);
        rows.insert(form.id().raw(), form);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<F: Form> Repository<F> for MockRepository<F> {
    async fn init(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn fetch(&self, id: F::Id, field: F::Field) -> Result<F, StoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(StoreError::Transient("injected failure".to_string()));
        }
        let rows = self.rows.lock().unwrap();
        rows.get(&id.raw())
            .map(|row| row.project(field))
            .ok_or_else(|| StoreError::not_found(F::KIND, id))
    }

    async fn update(&self, id: F::Id, patch: F) -> Result<F, StoreError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .get_mut(&id.raw())
            .ok_or_else(|| StoreError::not_found(F::KIND, id))?;
        row.apply(&patch);
        let mut echo = F::with_id(id);
        echo.apply(&patch);
        Ok(echo)
    }

    async fn insert(&self, form: F) -> Result<F, StoreError> {
        let id = F::Id::from_raw(self.next_id.fetch_add(1, Ordering::SeqCst));
        let mut stored = F::with_id(id);
        stored.apply(&form);
        self.rows.lock().unwrap().insert(id.raw(), stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: F::Id) -> Result<(), StoreError> {
        self.rows
            .lock()
            .unwrap()
            .remove(&id.raw())
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(F::KIND, id))
    }

    async fn count(&self, _parent: F::Parent) -> Result<u64, StoreError> {
        Ok(self.rows.lock().unwrap().len() as u64)
    }

    async fn list(&self, _parent: F::Parent, page: Page) -> Result<Vec<F>, StoreError> {
        let rows: Vec<F> = self.rows.lock().unwrap().values().cloned().collect();
        Ok(page.window(rows, |form| form.id().raw()))
    }

    async fn remove_all(&self) -> Result<(), StoreError> {
        self.rows.lock().unwrap().clear();
        Ok(())
    }
}
