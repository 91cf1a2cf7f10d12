//! Cart lines.

use serde::{Deserialize, Serialize};
use shopkeep_entity::{define_form, Slot, StoreError};

use crate::cart::{Cart, CartForm};
use crate::catalog::{ProductItem, ProductItemForm};
use crate::error::Result;
use crate::ids::{CartId, CartItemId};

/// Maximum quantity allowed per line item.
pub const MAX_QUANTITY_PER_ITEM: i64 = 9999;

/// Reject quantities outside `1..=MAX_QUANTITY_PER_ITEM`.
pub fn validate_quantity(quantity: i64) -> std::result::Result<i64, StoreError> {
    if (1..=MAX_QUANTITY_PER_ITEM).contains(&quantity) {
        Ok(quantity)
    } else {
        Err(StoreError::Validation(format!(
            "quantity {} outside 1..={}",
            quantity, MAX_QUANTITY_PER_ITEM
        )))
    }
}

/// A custom property on a line item, such as a size or an engraving.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineItemProperty {
    /// Property name.
    pub name: String,
    /// Property value.
    pub value: String,
}

impl LineItemProperty {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

define_form! {
    /// Stored attributes of a cart line.
    pub struct CartItemForm: "cart item" {
        id: CartItemId,
        parent: CartId,
        field: CartItemField,
        quantity: i64 => Quantity,
        /// Ordered; names may repeat.
        attributes: Vec<LineItemProperty> => Attributes,
    }
    links {
        cart: CartForm => Cart,
        product_item: ProductItemForm => ProductItem,
    }
}

define_wrapper!(
    /// One line of a cart.
    CartItem(CartItemForm, CartItemId) via cart_items
);

impl CartItem {
    pub async fn cart(&self) -> Result<Cart> {
        let form = self.entity.require(CartItemField::Cart, |f| &f.cart).await?;
        Ok(Cart::hydrated(form, &self.stores))
    }

    /// The item being bought, pre-filled with whatever the store joined.
    pub async fn product_item(&self) -> Result<ProductItem> {
        let form = self
            .entity
            .require(CartItemField::ProductItem, |f| &f.product_item)
            .await?;
        Ok(ProductItem::hydrated(form, &self.stores))
    }

    pub async fn quantity(&self) -> Result<i64> {
        Ok(self
            .entity
            .require(CartItemField::Quantity, |f| &f.quantity)
            .await?)
    }

    pub async fn set_quantity(&self, quantity: i64) -> Result<()> {
        let patch = CartItemForm {
            quantity: Slot::Value(validate_quantity(quantity)?),
            ..Default::default()
        };
        self.entity.set(patch).await?;
        Ok(())
    }

    pub async fn attributes(&self) -> Result<Vec<LineItemProperty>> {
        Ok(self
            .entity
            .require(CartItemField::Attributes, |f| &f.attributes)
            .await?)
    }

    pub async fn set_attributes(&self, attributes: Vec<LineItemProperty>) -> Result<()> {
        let patch = CartItemForm {
            attributes: Slot::Value(attributes),
            ..Default::default()
        };
        self.entity.set(patch).await?;
        Ok(())
    }
}
