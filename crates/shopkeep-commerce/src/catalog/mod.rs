//! Product catalog module.
//!
//! Contains products, their purchasable items, and shipping methods.

mod item;
mod product;
mod shipping;

pub use item::{ProductItem, ProductItemField, ProductItemForm};
pub use product::{Product, ProductField, ProductForm, ProductManager};
pub use shipping::{ShippingMethod, ShippingMethodField, ShippingMethodForm, ShippingMethodManager};
