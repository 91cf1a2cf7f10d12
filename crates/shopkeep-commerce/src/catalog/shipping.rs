//! Shipping methods.

use shopkeep_entity::{define_form, Page, Slot};
use tracing::{info, instrument};

use crate::error::Result;
use crate::ids::ShippingMethodId;
use crate::money::Money;
use crate::stores::Stores;

define_form! {
    /// Stored attributes of a shipping method.
    pub struct ShippingMethodForm: "shipping method" {
        id: ShippingMethodId,
        parent: (),
        field: ShippingMethodField,
        name: String => Name,
        /// Nullable; a null price ships for free.
        price: Money => Price,
        /// Nullable.
        delivery_days: u32 => DeliveryDays,
    }
    links {}
}

define_wrapper!(
    /// A way of shipping an order.
    ShippingMethod(ShippingMethodForm, ShippingMethodId) via shipping_methods
);

impl ShippingMethod {
    pub async fn name(&self) -> Result<String> {
        Ok(self
            .entity
            .require(ShippingMethodField::Name, |f| &f.name)
            .await?)
    }

    /// The price, zero when the store holds none.
    pub async fn price(&self) -> Result<Money> {
        let price = self
            .entity
            .get(ShippingMethodField::Price, |f| &f.price)
            .await?;
        Ok(price.unwrap_or_else(|| Money::zero(self.stores.currency)))
    }

    /// Set or clear the price.
    pub async fn set_price(&self, price: Option<Money>) -> Result<()> {
        let patch = ShippingMethodForm {
            price: Slot::from_option(price),
            ..Default::default()
        };
        self.entity.set(patch).await?;
        Ok(())
    }

    pub async fn delivery_days(&self) -> Result<Option<u32>> {
        Ok(self
            .entity
            .get(ShippingMethodField::DeliveryDays, |f| &f.delivery_days)
            .await?)
    }
}

/// Creates, finds and lists shipping methods.
#[derive(Debug, Clone)]
pub struct ShippingMethodManager {
    stores: Stores,
}

impl ShippingMethodManager {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub(crate) async fn init(&self) -> Result<()> {
        self.stores.shipping_methods().init().await?;
        Ok(())
    }

    #[instrument(skip(self, name))]
    pub async fn create(
        &self,
        name: impl Into<String>,
        price: Option<Money>,
        delivery_days: Option<u32>,
    ) -> Result<ShippingMethod> {
        let form = ShippingMethodForm {
            name: Slot::Value(name.into()),
            price: Slot::from_option(price),
            delivery_days: Slot::from_option(delivery_days),
            ..Default::default()
        };
        let entity = self.stores.shipping_methods().insert(form).await?;
        info!(shipping_method = %entity.id(), "shipping method created");
        Ok(ShippingMethod::from_entity(entity, self.stores.clone()))
    }

    /// A wrapper for `id`. Performs no I/O.
    pub fn find(&self, id: ShippingMethodId) -> ShippingMethod {
        ShippingMethod::lazy(id, &self.stores)
    }

    pub async fn list(&self, page: Page) -> Result<Vec<ShippingMethod>> {
        let entities = self.stores.shipping_methods().list((), page).await?;
        Ok(entities
            .into_iter()
            .map(|entity| ShippingMethod::from_entity(entity, self.stores.clone()))
            .collect())
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(self.stores.shipping_methods().count(()).await?)
    }

    pub async fn remove_all(&self) -> Result<()> {
        self.stores.shipping_methods().remove_all().await?;
        Ok(())
    }
}
