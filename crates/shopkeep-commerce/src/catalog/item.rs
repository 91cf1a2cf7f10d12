//! Product items: the purchasable SKUs of a product.

use shopkeep_entity::{define_form, Slot, StoreError};

use crate::catalog::{Product, ProductForm};
use crate::error::Result;
use crate::ids::{ProductId, ProductItemId};
use crate::money::Money;

define_form! {
    /// Stored attributes of a product item.
    pub struct ProductItemForm: "product item" {
        id: ProductItemId,
        parent: ProductId,
        field: ProductItemField,
        /// Unique across items.
        sku: String => Sku,
        price: Money => Price,
        stock: i64 => Stock,
    }
    links {
        product: ProductForm => Product,
    }
}

define_wrapper!(
    /// One purchasable SKU of a product.
    ProductItem(ProductItemForm, ProductItemId) via product_items
);

impl ProductItem {
    /// The product, pre-filled with whatever the store joined.
    pub async fn product(&self) -> Result<Product> {
        let form = self
            .entity
            .require(ProductItemField::Product, |f| &f.product)
            .await?;
        Ok(Product::hydrated(form, &self.stores))
    }

    pub async fn sku(&self) -> Result<String> {
        Ok(self.entity.require(ProductItemField::Sku, |f| &f.sku).await?)
    }

    pub async fn price(&self) -> Result<Money> {
        Ok(self
            .entity
            .require(ProductItemField::Price, |f| &f.price)
            .await?)
    }

    pub async fn set_price(&self, price: Money) -> Result<()> {
        let patch = ProductItemForm {
            price: Slot::Value(price),
            ..Default::default()
        };
        self.entity.set(patch).await?;
        Ok(())
    }

    pub async fn stock(&self) -> Result<i64> {
        Ok(self
            .entity
            .require(ProductItemField::Stock, |f| &f.stock)
            .await?)
    }

    pub async fn set_stock(&self, stock: i64) -> Result<()> {
        if stock < 0 {
            return Err(StoreError::Validation(format!(
                "stock must not be negative (got {})",
                stock
            ))
            .into());
        }
        let patch = ProductItemForm {
            stock: Slot::Value(stock),
            ..Default::default()
        };
        self.entity.set(patch).await?;
        Ok(())
    }
}
