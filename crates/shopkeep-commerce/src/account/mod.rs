//! Accounts and what they own directly: addresses and payment methods.

mod account;
mod address;
mod payment;

pub use account::{Account, AccountField, AccountForm, AccountManager};
pub use address::{Address, AddressDetails, AddressField, AddressForm};
pub use payment::{PaymentMethod, PaymentMethodField, PaymentMethodForm};
