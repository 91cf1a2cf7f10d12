//! The collaborator bundle every wrapper and manager carries.

use std::sync::Arc;

use shopkeep_entity::{Collection, Repository, SharedRepository};
use shopkeep_files::SharedFiles;

use crate::account::{AccountForm, AddressForm, PaymentMethodForm};
use crate::cart::{CartForm, CartItemForm};
use crate::catalog::{ProductForm, ProductItemForm, ShippingMethodForm};
use crate::checkout::{CheckoutPort, OrderForm, OrderStatusForm};
use crate::money::Currency;

/// One port per entity kind plus checkout and file storage.
///
/// Cloning is cheap: every member is shared.
#[derive(Clone)]
pub struct Stores {
    pub accounts: SharedRepository<AccountForm>,
    pub addresses: SharedRepository<AddressForm>,
    pub payment_methods: SharedRepository<PaymentMethodForm>,
    pub products: SharedRepository<ProductForm>,
    pub product_items: SharedRepository<ProductItemForm>,
    pub shipping_methods: SharedRepository<ShippingMethodForm>,
    pub order_statuses: SharedRepository<OrderStatusForm>,
    pub carts: SharedRepository<CartForm>,
    pub cart_items: SharedRepository<CartItemForm>,
    pub orders: SharedRepository<OrderForm>,
    pub checkout: Arc<dyn CheckoutPort>,
    pub files: SharedFiles,
    /// Currency of amounts the store leaves null.
    pub currency: Currency,
}

impl Stores {
    /// Wire every port to one backend that implements them all.
    pub fn from_backend<B>(backend: Arc<B>, files: SharedFiles) -> Self
    where
        B: Repository<AccountForm>
            + Repository<AddressForm>
            + Repository<PaymentMethodForm>
            + Repository<ProductForm>
            + Repository<ProductItemForm>
            + Repository<ShippingMethodForm>
            + Repository<OrderStatusForm>
            + Repository<CartForm>
            + Repository<CartItemForm>
            + Repository<OrderForm>
            + CheckoutPort
            + 'static,
    {
        Self {
            accounts: backend.clone(),
            addresses: backend.clone(),
            payment_methods: backend.clone(),
            products: backend.clone(),
            product_items: backend.clone(),
            shipping_methods: backend.clone(),
            order_statuses: backend.clone(),
            carts: backend.clone(),
            cart_items: backend.clone(),
            orders: backend.clone(),
            checkout: backend,
            files,
            currency: Currency::default(),
        }
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub(crate) fn accounts(&self) -> Collection<AccountForm> {
        Collection::new(Arc::clone(&self.accounts))
    }

    pub(crate) fn addresses(&self) -> Collection<AddressForm> {
        Collection::new(Arc::clone(&self.addresses))
    }

    pub(crate) fn payment_methods(&self) -> Collection<PaymentMethodForm> {
        Collection::new(Arc::clone(&self.payment_methods))
    }

    pub(crate) fn products(&self) -> Collection<ProductForm> {
        Collection::new(Arc::clone(&self.products))
    }

    pub(crate) fn product_items(&self) -> Collection<ProductItemForm> {
        Collection::new(Arc::clone(&self.product_items))
    }

    pub(crate) fn shipping_methods(&self) -> Collection<ShippingMethodForm> {
        Collection::new(Arc::clone(&self.shipping_methods))
    }

    pub(crate) fn order_statuses(&self) -> Collection<OrderStatusForm> {
        Collection::new(Arc::clone(&self.order_statuses))
    }

    pub(crate) fn carts(&self) -> Collection<CartForm> {
        Collection::new(Arc::clone(&self.carts))
    }

    pub(crate) fn cart_items(&self) -> Collection<CartItemForm> {
        Collection::new(Arc::clone(&self.cart_items))
    }

    pub(crate) fn orders(&self) -> Collection<OrderForm> {
        Collection::new(Arc::clone(&self.orders))
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores")
            .field("currency", &self.currency)
            .finish_non_exhaustive()
    }
}
