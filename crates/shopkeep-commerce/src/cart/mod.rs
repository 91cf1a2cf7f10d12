//! Shopping cart module.
//!
//! Contains carts, their lines, and the manager that checks them out.

mod cart;
mod item;

pub use cart::{Cart, CartField, CartForm, CartManager};
pub use item::{
    validate_quantity, CartItem, CartItemField, CartItemForm, LineItemProperty,
    MAX_QUANTITY_PER_ITEM,
};
