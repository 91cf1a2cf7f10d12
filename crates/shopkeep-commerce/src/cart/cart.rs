//! Carts and checkout.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use shopkeep_entity::{define_form, Page, Slot, StoreError};
use tracing::{info, instrument, warn};

use crate::account::{Account, AccountForm};
use crate::cart::{validate_quantity, CartItem, CartItemForm, LineItemProperty};
use crate::checkout::{CheckoutReceipt, CheckoutRequest, Order};
use crate::config::CommerceConfig;
use crate::error::Result;
use crate::ids::{AccountId, CartId, CartItemId, ProductItemId};
use crate::stores::Stores;

define_form! {
    /// Stored attributes of a cart.
    pub struct CartForm: "cart" {
        id: CartId,
        parent: AccountId,
        field: CartField,
        created_at: DateTime<Utc> => CreatedAt,
    }
    links {
        account: AccountForm => Account,
    }
}

define_wrapper!(
    /// A shopping cart owned by an account. Checkout consumes it.
    Cart(CartForm, CartId) via carts
);

impl Cart {
    pub async fn account(&self) -> Result<Account> {
        let form = self.entity.require(CartField::Account, |f| &f.account).await?;
        Ok(Account::hydrated(form, &self.stores))
    }

    pub async fn created_at(&self) -> Result<DateTime<Utc>> {
        Ok(self
            .entity
            .require(CartField::CreatedAt, |f| &f.created_at)
            .await?)
    }

    pub async fn items(&self, page: Page) -> Result<Vec<CartItem>> {
        let entities = self.stores.cart_items().list(self.id(), page).await?;
        Ok(entities
            .into_iter()
            .map(|entity| CartItem::from_entity(entity, self.stores.clone()))
            .collect())
    }

    pub async fn item_count(&self) -> Result<u64> {
        Ok(self.stores.cart_items().count(self.id()).await?)
    }

    /// Add a line. The quantity must be within `1..=MAX_QUANTITY_PER_ITEM`.
    #[instrument(skip(self, attributes), fields(cart = %self.id()))]
    pub async fn add_item(
        &self,
        product_item: ProductItemId,
        quantity: i64,
        attributes: Vec<LineItemProperty>,
    ) -> Result<CartItem> {
        if !product_item.is_assigned() {
            return Err(StoreError::unassigned("product item").into());
        }
        let form = CartItemForm {
            cart: Slot::link(self.id()),
            product_item: Slot::link(product_item),
            quantity: Slot::Value(validate_quantity(quantity)?),
            attributes: Slot::Value(attributes),
            ..Default::default()
        };
        let entity = self.stores.cart_items().insert(form).await?;
        Ok(CartItem::from_entity(entity, self.stores.clone()))
    }

    /// Remove one line of this cart. A line of another cart is `Validation`.
    #[instrument(skip(self), fields(cart = %self.id()))]
    pub async fn remove_item(&self, item: CartItemId) -> Result<()> {
        let item = CartItem::lazy(item, &self.stores);
        let owner = item.cart().await?.id();
        if owner != self.id() {
            warn!(item = %item.id(), %owner, "refusing to remove a line of another cart");
            return Err(StoreError::Validation(format!(
                "cart item {} belongs to cart {}",
                item.id(),
                owner
            ))
            .into());
        }
        item.delete().await
    }

    /// Remove every line.
    #[instrument(skip(self), fields(cart = %self.id()))]
    pub async fn clear(&self) -> Result<()> {
        let items = self.stores.cart_items().list(self.id(), Page::all()).await?;
        for item in &items {
            item.delete().await?;
        }
        info!(removed = items.len(), "cart cleared");
        Ok(())
    }
}

/// Finds carts and checks them out.
#[derive(Debug, Clone)]
pub struct CartManager {
    stores: Stores,
    config: Arc<CommerceConfig>,
}

impl CartManager {
    pub fn new(stores: Stores, config: Arc<CommerceConfig>) -> Self {
        Self { stores, config }
    }

    pub(crate) async fn init(&self) -> Result<()> {
        self.stores.carts().init().await?;
        self.stores.cart_items().init().await?;
        Ok(())
    }

    /// A wrapper for `id`. Performs no I/O.
    pub fn find(&self, id: CartId) -> Cart {
        Cart::lazy(id, &self.stores)
    }

    pub async fn list(&self, account: AccountId, page: Page) -> Result<Vec<Cart>> {
        let entities = self.stores.carts().list(account, page).await?;
        Ok(entities
            .into_iter()
            .map(|entity| Cart::from_entity(entity, self.stores.clone()))
            .collect())
    }

    pub async fn count(&self, account: AccountId) -> Result<u64> {
        Ok(self.stores.carts().count(account).await?)
    }

    /// Turn a cart into an order in one atomic step.
    ///
    /// An unassigned status in `request` is replaced by the configured
    /// initial status. The configured currency and empty-cart policy are
    /// always used. On success the cart and its lines no longer exist.
    #[instrument(skip(self, request), fields(cart = %request.cart))]
    pub async fn checkout(&self, mut request: CheckoutRequest) -> Result<(CheckoutReceipt, Order)> {
        if !request.initial_status.is_assigned() {
            request.initial_status = self.config.initial_order_status;
        }
        request.currency = self.stores.currency;
        request.require_lines = !self.config.allow_empty_checkout;
        request.validate()?;

        let receipt = self.stores.checkout.checkout(&request).await?;
        info!(
            order = %receipt.order_id,
            account = %receipt.account_id,
            total = %receipt.total,
            lines = receipt.line_count,
            "checked out"
        );
        let order = Order::hydrated(receipt.order_form(&request), &self.stores);
        Ok((receipt, order))
    }

    /// Remove every cart and cart line.
    #[instrument(skip(self))]
    pub async fn remove_all(&self) -> Result<()> {
        self.stores.cart_items().remove_all().await?;
        self.stores.carts().remove_all().await?;
        Ok(())
    }
}
