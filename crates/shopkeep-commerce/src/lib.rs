//! Accounts, catalog, carts and orders for Shopkeep.
//!
//! Every type here is a thin typed instantiation of the `shopkeep-entity`
//! cache:
//!
//! - **Account**: Accounts, shipping addresses, payment methods
//! - **Catalog**: Products, product items (SKUs), shipping methods
//! - **Cart**: Carts and cart lines
//! - **Checkout**: The atomic checkout port, orders, order statuses
//!
//! Wrappers fetch attributes lazily through the ports in [`Stores`] and
//! cache them per instance.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopkeep_commerce::prelude::*;
//!
//! let commerce = Commerce::new(stores, CommerceConfig::load("shop.toml")?).await?;
//!
//! // Create an account and fill a cart
//! let account = commerce.accounts().create("ada@example.com", "Ada").await?;
//! let cart = account.new_cart().await?;
//! cart.add_item(mug_item.id(), 2, vec![]).await?;
//!
//! // Check out
//! let request = CheckoutRequest::new(cart.id(), payment.id(), address.id(), courier.id());
//! let (receipt, order) = commerce.carts().checkout(request).await?;
//! println!("Order {} total: {}", receipt.order_id, receipt.total);
//! ```

#[macro_use]
mod wrapper;

pub mod config;
pub mod error;
pub mod ids;
pub mod money;
pub mod stores;

pub mod account;
pub mod cart;
pub mod catalog;
pub mod checkout;

mod commerce;

#[cfg(test)]
mod test_support;

pub use commerce::Commerce;
pub use config::{CommerceConfig, ConfigError};
pub use error::{CommerceError, Result};
pub use ids::*;
pub use money::{Currency, Money};
pub use stores::Stores;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::commerce::Commerce;
    pub use crate::config::CommerceConfig;
    pub use crate::error::{CommerceError, Result};
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};
    pub use crate::stores::Stores;

    // Account
    pub use crate::account::{Account, AccountManager, Address, AddressDetails, PaymentMethod};

    // Catalog
    pub use crate::catalog::{
        Product, ProductItem, ProductManager, ShippingMethod, ShippingMethodManager,
    };

    // Cart
    pub use crate::cart::{Cart, CartItem, CartManager, LineItemProperty, MAX_QUANTITY_PER_ITEM};

    // Checkout
    pub use crate::checkout::{
        CheckoutPort, CheckoutReceipt, CheckoutRequest, Order, OrderImport, OrderLine,
        OrderManager, OrderStatus, OrderStatusManager,
    };

    pub use shopkeep_entity::{Page, SortOrder};
}
