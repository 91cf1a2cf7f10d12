//! The atomic checkout port.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shopkeep_entity::{Slot, StoreError};

use crate::checkout::OrderForm;
use crate::ids::{
    AccountId, AddressId, CartId, OrderId, OrderStatusId, PaymentMethodId, ShippingMethodId,
};
use crate::money::{Currency, Money};

/// Everything checkout needs besides the cart's own contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub cart: CartId,
    pub payment_method: PaymentMethodId,
    pub address: AddressId,
    pub shipping_method: ShippingMethodId,
    /// Status of the new order; the cart manager fills in the configured one.
    pub initial_status: OrderStatusId,
    pub comment: Option<String>,
    /// Currency of the total.
    pub currency: Currency,
    /// Refuse a cart without lines. Checked inside the checkout unit, after
    /// the cart is resolved.
    #[serde(default)]
    pub require_lines: bool,
}

impl CheckoutRequest {
    pub fn new(
        cart: CartId,
        payment_method: PaymentMethodId,
        address: AddressId,
        shipping_method: ShippingMethodId,
    ) -> Self {
        Self {
            cart,
            payment_method,
            address,
            shipping_method,
            initial_status: OrderStatusId::UNASSIGNED,
            comment: None,
            currency: Currency::default(),
            require_lines: false,
        }
    }

    pub fn with_status(mut self, status: OrderStatusId) -> Self {
        self.initial_status = status;
        self
    }

    pub fn with_lines_required(mut self, required: bool) -> Self {
        self.require_lines = required;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Every referenced identifier must be assigned.
    pub fn validate(&self) -> Result<(), StoreError> {
        if !self.cart.is_assigned() {
            return Err(StoreError::unassigned("cart"));
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
        if !self.initial_status.is_assigned() {
            return Err(StoreError::unassigned("initial order status"));
        }
        Ok(())
    }
}

/// What a successful checkout produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutReceipt {
    pub order_id: OrderId,
    pub account_id: AccountId,
    pub date: NaiveDate,
    pub total: Money,
    pub line_count: usize,
}

impl CheckoutReceipt {
    /// The order as far as the receipt and its request describe it.
    pub fn order_form(&self, request: &CheckoutRequest) -> OrderForm {
        OrderForm {
            id: self.order_id,
            account: Slot::link(self.account_id),
            date: Slot::Value(self.date),
            total: Slot::Value(self.total),
            payment_method: Slot::link(request.payment_method),
            address: Slot::link(request.address),
            shipping_method: Slot::link(request.shipping_method),
            status: Slot::link(request.initial_status),
            comment: Slot::from_option(request.comment.clone()),
            ..Default::default()
        }
    }
}

/// Atomic cart-to-order transition.
///
/// One call either creates the order and deletes the cart with its lines, or
/// changes nothing. Two concurrent checkouts of one cart yield one success and
/// one `NotFound`.
#[async_trait]
pub trait CheckoutPort: Send + Sync {
    async fn checkout(&self, request: &CheckoutRequest) -> Result<CheckoutReceipt, StoreError>;
}
