//! Order statuses.

use shopkeep_entity::{define_form, Page, Slot};
use tracing::{info, instrument};

use crate::error::Result;
use crate::ids::OrderStatusId;
use crate::stores::Stores;

define_form! {
    /// Stored attributes of an order status.
    pub struct OrderStatusForm: "order status" {
        id: OrderStatusId,
        parent: (),
        field: OrderStatusField,
        name: String => Name,
        /// No further transitions expected (delivered, cancelled, ...).
        is_final: bool => IsFinal,
    }
    links {}
}

define_wrapper!(
    /// A named stage in an order's life.
    OrderStatus(OrderStatusForm, OrderStatusId) via order_statuses
);

impl OrderStatus {
    pub async fn name(&self) -> Result<String> {
        Ok(self
            .entity
            .require(OrderStatusField::Name, |f| &f.name)
            .await?)
    }

    pub async fn is_final(&self) -> Result<bool> {
        Ok(self
            .entity
            .require(OrderStatusField::IsFinal, |f| &f.is_final)
            .await?)
    }
}

/// Creates, finds and lists order statuses.
#[derive(Debug, Clone)]
pub struct OrderStatusManager {
    stores: Stores,
}

impl OrderStatusManager {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub(crate) async fn init(&self) -> Result<()> {
        self.stores.order_statuses().init().await?;
        Ok(())
    }

    #[instrument(skip(self, name))]
    pub async fn create(&self, name: impl Into<String>, is_final: bool) -> Result<OrderStatus> {
        let form = OrderStatusForm {
            name: Slot::Value(name.into()),
            is_final: Slot::Value(is_final),
            ..Default::default()
        };
        let entity = self.stores.order_statuses().insert(form).await?;
        info!(status = %entity.id(), "order status created");
        Ok(OrderStatus::from_entity(entity, self.stores.clone()))
    }

    /// A wrapper for `id`. Performs no I/O.
    pub fn find(&self, id: OrderStatusId) -> OrderStatus {
        OrderStatus::lazy(id, &self.stores)
    }

    pub async fn list(&self, page: Page) -> Result<Vec<OrderStatus>> {
        let entities = self.stores.order_statuses().list((), page).await?;
        Ok(entities
            .into_iter()
            .map(|entity| OrderStatus::from_entity(entity, self.stores.clone()))
            .collect())
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(self.stores.order_statuses().count(()).await?)
    }

    pub async fn remove_all(&self) -> Result<()> {
        self.stores.order_statuses().remove_all().await?;
        Ok(())
    }
}
