//! The facade bundling every manager.

use std::sync::Arc;

use shopkeep_entity::Page;
use tracing::{info, instrument};

use crate::account::AccountManager;
use crate::cart::CartManager;
use crate::catalog::{ProductManager, ShippingMethodManager};
use crate::checkout::{OrderManager, OrderStatusManager};
use crate::config::CommerceConfig;
use crate::error::Result;
use crate::stores::Stores;

/// Entry point: one manager per top-level kind, all sharing one set of ports.
#[derive(Debug, Clone)]
pub struct Commerce {
    config: Arc<CommerceConfig>,
    stores: Stores,
    accounts: AccountManager,
    products: ProductManager,
    shipping_methods: ShippingMethodManager,
    order_statuses: OrderStatusManager,
    carts: CartManager,
    orders: OrderManager,
}

impl Commerce {
    /// Wire the managers and run every schema bootstrap. Any init error aborts.
    #[instrument(skip_all)]
    pub async fn new(stores: Stores, config: CommerceConfig) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);
        let stores = stores.with_currency(config.currency);

        let commerce = Self {
            accounts: AccountManager::new(stores.clone()),
            products: ProductManager::new(stores.clone()),
            shipping_methods: ShippingMethodManager::new(stores.clone()),
            order_statuses: OrderStatusManager::new(stores.clone()),
            carts: CartManager::new(stores.clone(), Arc::clone(&config)),
            orders: OrderManager::new(stores.clone()),
            config,
            stores,
        };

        commerce.accounts.init().await?;
        commerce.products.init().await?;
        commerce.shipping_methods.init().await?;
        commerce.order_statuses.init().await?;
        commerce.carts.init().await?;
        commerce.orders.init().await?;
        info!(currency = %commerce.config.currency, "commerce ready");
        Ok(commerce)
    }

    pub fn config(&self) -> &CommerceConfig {
        &self.config
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub fn accounts(&self) -> &AccountManager {
        &self.accounts
    }

    pub fn products(&self) -> &ProductManager {
        &self.products
    }

    pub fn shipping_methods(&self) -> &ShippingMethodManager {
        &self.shipping_methods
    }

    pub fn order_statuses(&self) -> &OrderStatusManager {
        &self.order_statuses
    }

    pub fn carts(&self) -> &CartManager {
        &self.carts
    }

    pub fn orders(&self) -> &OrderManager {
        &self.orders
    }

    /// A listing page clamped by the configured sizes.
    pub fn page(&self, skip: u64, limit: Option<u64>) -> Page {
        self.config.page(skip, limit)
    }

    /// Empty every table, children first.
    #[instrument(skip(self))]
    pub async fn remove_all(&self) -> Result<()> {
        self.carts.remove_all().await?;
        self.orders.remove_all().await?;
        self.products.remove_all().await?;
        self.shipping_methods.remove_all().await?;
        self.order_statuses.remove_all().await?;
        self.accounts.remove_all().await?;
        Ok(())
    }
}
