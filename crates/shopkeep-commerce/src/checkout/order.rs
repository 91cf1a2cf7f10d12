//! Orders.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shopkeep_entity::{define_form, Page, Slot, StoreError};
use tracing::{info, instrument};

use crate::account::{Account, AccountForm, Address, AddressForm, PaymentMethod, PaymentMethodForm};
use crate::cart::{validate_quantity, LineItemProperty};
use crate::catalog::{ShippingMethod, ShippingMethodForm};
use crate::checkout::{OrderStatus, OrderStatusForm};
use crate::error::Result;
use crate::ids::{
    AccountId, AddressId, OrderId, OrderStatusId, PaymentMethodId, ProductItemId,
    ShippingMethodId,
};
use crate::money::Money;
use crate::stores::Stores;

/// One line of an order, copied from the cart at checkout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderLine {
    pub product_item: ProductItemId,
    pub quantity: i64,
    /// Price of one unit when the order was placed.
    pub unit_price: Money,
    pub attributes: Vec<LineItemProperty>,
}

impl OrderLine {
    /// `quantity * unit_price`, `None` on overflow.
    pub fn subtotal(&self) -> Option<Money> {
        self.unit_price.checked_mul(self.quantity)
    }
}

define_form! {
    /// Stored attributes of an order.
    pub struct OrderForm: "order" {
        id: OrderId,
        parent: AccountId,
        field: OrderField,
        date: NaiveDate => Date,
        total: Money => Total,
        /// In cart-line order.
        lines: Vec<OrderLine> => Lines,
        /// Nullable.
        comment: String => Comment,
        /// Nullable.
        delivery_date: NaiveDate => DeliveryDate,
    }
    links {
        account: AccountForm => Account,
        payment_method: PaymentMethodForm => PaymentMethod,
        address: AddressForm => Address,
        shipping_method: ShippingMethodForm => ShippingMethod,
        status: OrderStatusForm => Status,
    }
}

define_wrapper!(
    /// A placed order. Only its status and delivery date change afterwards.
    Order(OrderForm, OrderId) via orders
);

impl Order {
    pub async fn account(&self) -> Result<Account> {
        let form = self.entity.require(OrderField::Account, |f| &f.account).await?;
        Ok(Account::hydrated(form, &self.stores))
    }

    pub async fn date(&self) -> Result<NaiveDate> {
        Ok(self.entity.require(OrderField::Date, |f| &f.date).await?)
    }

    pub async fn total(&self) -> Result<Money> {
        Ok(self.entity.require(OrderField::Total, |f| &f.total).await?)
    }

    pub async fn lines(&self) -> Result<Vec<OrderLine>> {
        Ok(self.entity.require(OrderField::Lines, |f| &f.lines).await?)
    }

    pub async fn line_count(&self) -> Result<usize> {
        Ok(self.lines().await?.len())
    }

    pub async fn comment(&self) -> Result<Option<String>> {
        Ok(self.entity.get(OrderField::Comment, |f| &f.comment).await?)
    }

    pub async fn payment_method(&self) -> Result<PaymentMethod> {
        let form = self
            .entity
            .require(OrderField::PaymentMethod, |f| &f.payment_method)
            .await?;
        Ok(PaymentMethod::hydrated(form, &self.stores))
    }

    pub async fn address(&self) -> Result<Address> {
        let form = self.entity.require(OrderField::Address, |f| &f.address).await?;
        Ok(Address::hydrated(form, &self.stores))
    }

    pub async fn shipping_method(&self) -> Result<ShippingMethod> {
        let form = self
            .entity
            .require(OrderField::ShippingMethod, |f| &f.shipping_method)
            .await?;
        Ok(ShippingMethod::hydrated(form, &self.stores))
    }

    pub async fn status(&self) -> Result<OrderStatus> {
        let form = self.entity.require(OrderField::Status, |f| &f.status).await?;
        Ok(OrderStatus::hydrated(form, &self.stores))
    }

    #[instrument(skip(self), fields(order = %self.id()))]
    pub async fn set_status(&self, status: OrderStatusId) -> Result<()> {
        if !status.is_assigned() {
            return Err(StoreError::unassigned("order status").into());
        }
        let patch = OrderForm {
            status: Slot::link(status),
            ..Default::default()
        };
        self.entity.set(patch).await?;
        info!(%status, "order status changed");
        Ok(())
    }

    pub async fn delivery_date(&self) -> Result<Option<NaiveDate>> {
        Ok(self
            .entity
            .get(OrderField::DeliveryDate, |f| &f.delivery_date)
            .await?)
    }

    /// Set or clear the delivery date.
    pub async fn set_delivery_date(&self, date: Option<NaiveDate>) -> Result<()> {
        let patch = OrderForm {
            delivery_date: Slot::from_option(date),
            ..Default::default()
        };
        self.entity.set(patch).await?;
        Ok(())
    }
}

/// A complete order inserted outside checkout, e.g. from another system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderImport {
    pub account: AccountId,
    pub date: NaiveDate,
    pub payment_method: PaymentMethodId,
    pub address: AddressId,
    pub shipping_method: ShippingMethodId,
    pub status: OrderStatusId,
    pub total: Money,
    pub lines: Vec<OrderLine>,
    pub comment: Option<String>,
    pub delivery_date: Option<NaiveDate>,
}

impl OrderImport {
    fn into_form(self) -> std::result::Result<OrderForm, StoreError> {
        if !self.account.is_assigned() {
            return Err(StoreError::unassigned("account"));
        }
        if !self.payment_method.is_assigned() {
            return Err(StoreError::unassigned("payment method"));
        }
        if !self.address.is_assigned() {
            return Err(StoreError::unassigned("address"));
        }
        if !self.shipping_method.is_assigned() {
            return Err(StoreError::unassigned("shipping method"));
        }
        if !self.status.is_assigned() {
            return Err(StoreError::unassigned("order status"));
        }
        for line in &self.lines {
            if !line.product_item.is_assigned() {
                return Err(StoreError::unassigned("product item"));
            }
            validate_quantity(line.quantity)?;
        }
        Ok(OrderForm {
            account: Slot::link(self.account),
            date: Slot::Value(self.date),
            total: Slot::Value(self.total),
            lines: Slot::Value(self.lines),
            comment: Slot::from_option(self.comment),
            delivery_date: Slot::from_option(self.delivery_date),
            payment_method: Slot::link(self.payment_method),
            address: Slot::link(self.address),
            shipping_method: Slot::link(self.shipping_method),
            status: Slot::link(self.status),
            ..Default::default()
        })
    }
}

/// Finds, lists and imports orders. Checkout lives on the cart manager.
#[derive(Debug, Clone)]
pub struct OrderManager {
    stores: Stores,
}

impl OrderManager {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub(crate) async fn init(&self) -> Result<()> {
        self.stores.orders().init().await?;
        Ok(())
    }

    /// A wrapper for `id`. Performs no I/O.
    pub fn find(&self, id: OrderId) -> Order {
        Order::lazy(id, &self.stores)
    }

    /// Orders of one account, sorted by order date.
    pub async fn list(&self, account: AccountId, page: Page) -> Result<Vec<Order>> {
        let entities = self.stores.orders().list(account, page).await?;
        Ok(entities
            .into_iter()
            .map(|entity| Order::from_entity(entity, self.stores.clone()))
            .collect())
    }

    pub async fn count(&self, account: AccountId) -> Result<u64> {
        Ok(self.stores.orders().count(account).await?)
    }

    /// Administrative insert of a complete order.
    #[instrument(skip(self, import), fields(account = %import.account))]
    pub async fn import(&self, import: OrderImport) -> Result<Order> {
        let form = import.into_form()?;
        let entity = self.stores.orders().insert(form).await?;
        info!(order = %entity.id(), "order imported");
        Ok(Order::from_entity(entity, self.stores.clone()))
    }

    pub async fn remove_all(&self) -> Result<()> {
        self.stores.orders().remove_all().await?;
        Ok(())
    }
}
