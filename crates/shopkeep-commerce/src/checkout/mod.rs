//! Checkout module.
//!
//! Contains the atomic checkout port, orders, and order statuses.

mod order;
mod port;
mod status;

pub use order::{Order, OrderField, OrderForm, OrderImport, OrderLine, OrderManager};
pub use port::{CheckoutPort, CheckoutReceipt, CheckoutRequest};
pub use status::{OrderStatus, OrderStatusField, OrderStatusForm, OrderStatusManager};
