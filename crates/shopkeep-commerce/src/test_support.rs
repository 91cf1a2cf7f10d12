//! Counting in-memory ports for unit tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use shopkeep_entity::{EntityId, Form, Page, Repository, StoreError};
use shopkeep_files::MemoryFiles;

use crate::account::{AccountForm, AddressForm, PaymentMethodForm};
use crate::cart::{CartForm, CartItemForm};
use crate::catalog::{ProductForm, ProductItemForm, ShippingMethodForm};
use crate::checkout::{CheckoutPort, CheckoutReceipt, CheckoutRequest, OrderForm, OrderStatusForm};
use crate::ids::{AccountId, OrderId};
use crate::money::Money;
use crate::stores::Stores;

/// Port over a map that counts fetches. Rows are scoped to a parent by `owned`.
pub struct MockRepository<F: Form> {
    rows: Mutex<BTreeMap<u64, F>>,
    next_id: AtomicU64,
    owned: fn(&F, F::Parent) -> bool,
    pub fetches: AtomicUsize,
}

impl<F: Form> MockRepository<F> {
    pub fn new(owned: fn(&F, F::Parent) -> bool) -> Arc<Self> {
        Arc::new(Self {
            rows: Mutex::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            owned,
            fetches: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl<F: Form> Repository<F> for MockRepository<F> {
    async fn init(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn fetch(&self, id: F::Id, field: F::Field) -> Result<F, StoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let rows = self.rows.lock().unwrap();
        rows.get(&id.raw())
            .map(|row| row.project(field))
            .ok_or_else(|| StoreError::not_found(F::KIND, id))
    }

    async fn update(&self, id: F::Id, patch: F) -> Result<F, StoreError> {
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

    async fn count(&self, parent: F::Parent) -> Result<u64, StoreError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.values().filter(|row| (self.owned)(row, parent)).count() as u64)
    }

    async fn list(&self, parent: F::Parent, page: Page) -> Result<Vec<F>, StoreError> {
        let rows: Vec<F> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|row| (self.owned)(row, parent))
            .cloned()
            .collect();
        Ok(page.window(rows, |form| form.id().raw()))
    }

    async fn remove_all(&self) -> Result<(), StoreError> {
        self.rows.lock().unwrap().clear();
        Ok(())
    }
}

/// Records checkout requests and answers with a canned outcome.
#[derive(Default)]
pub struct MockCheckout {
    requests: Mutex<Vec<CheckoutRequest>>,
    outcome: Mutex<Option<Result<CheckoutReceipt, StoreError>>>,
}

impl MockCheckout {
    pub fn last_request(&self) -> Option<CheckoutRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    pub fn fail_with(&self, err: StoreError) {
        *self.outcome.lock().unwrap() = Some(Err(err));
    }

    pub fn succeed_with(&self, receipt: CheckoutReceipt) {
        *self.outcome.lock().unwrap() = Some(Ok(receipt));
    }
}

#[async_trait]
impl CheckoutPort for MockCheckout {
    async fn checkout(&self, request: &CheckoutRequest) -> Result<CheckoutReceipt, StoreError> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        if let Some(outcome) = self.outcome.lock().unwrap().clone() {
            return outcome;
        }
        Ok(CheckoutReceipt {
            order_id: OrderId::new(1000 + requests.len() as u64),
            account_id: AccountId::new(1),
            date: Utc::now().date_naive(),
            total: Money::zero(request.currency),
            line_count: 0,
        })
    }
}

fn top_level<F>(_: &F, _: ()) -> bool {
    true
}

/// One mock port per kind.
pub struct TestBackend {
    pub accounts: Arc<MockRepository<AccountForm>>,
    pub addresses: Arc<MockRepository<AddressForm>>,
    pub payment_methods: Arc<MockRepository<PaymentMethodForm>>,
    pub products: Arc<MockRepository<ProductForm>>,
    pub product_items: Arc<MockRepository<ProductItemForm>>,
    pub shipping_methods: Arc<MockRepository<ShippingMethodForm>>,
    pub order_statuses: Arc<MockRepository<OrderStatusForm>>,
    pub carts: Arc<MockRepository<CartForm>>,
    pub cart_items: Arc<MockRepository<CartItemForm>>,
    pub orders: Arc<MockRepository<OrderForm>>,
    pub checkout: Arc<MockCheckout>,
    pub files: MemoryFiles,
}

impl TestBackend {
    pub fn new() -> Self {
        Self {
            accounts: MockRepository::new(top_level),
            addresses: MockRepository::<AddressForm>::new(|f, parent| f.account.link_id() == Some(parent)),
            payment_methods: MockRepository::<PaymentMethodForm>::new(|f, parent| f.account.link_id() == Some(parent)),
            products: MockRepository::new(top_level),
            product_items: MockRepository::<ProductItemForm>::new(|f, parent| f.product.link_id() == Some(parent)),
            shipping_methods: MockRepository::new(top_level),
            order_statuses: MockRepository::new(top_level),
            carts: MockRepository::<CartForm>::new(|f, parent| f.account.link_id() == Some(parent)),
            cart_items: MockRepository::<CartItemForm>::new(|f, parent| f.cart.link_id() == Some(parent)),
            orders: MockRepository::<OrderForm>::new(|f, parent| f.account.link_id() == Some(parent)),
            checkout: Arc::new(MockCheckout::default()),
            files: MemoryFiles::new(),
        }
    }

    pub fn stores(&self) -> Stores {
        Stores {
            accounts: self.accounts.clone(),
            addresses: self.addresses.clone(),
            payment_methods: self.payment_methods.clone(),
            products: self.products.clone(),
            product_items: self.product_items.clone(),
            shipping_methods: self.shipping_methods.clone(),
            order_statuses: self.order_statuses.clone(),
            carts: self.carts.clone(),
            cart_items: self.cart_items.clone(),
            orders: self.orders.clone(),
            checkout: self.checkout.clone(),
            files: Arc::new(self.files.clone()),
            currency: Default::default(),
        }
    }
}
