//! In-memory transactional backend for Shopkeep.
//!
//! [`MemoryStore`] implements every entity port and the checkout port over
//! one set of tables:
//!
//! - Rows are complete; links are stored as identifiers and joined on read
//! - Account emails and product SKUs are unique
//! - Deleting a referenced row is refused; deleting a cart drops its lines
//! - Checkout runs as a single all-or-nothing transaction
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shopkeep_commerce::prelude::*;
//! use shopkeep_files::MemoryFiles;
//! use shopkeep_store::MemoryStore;
//!
//! let stores = Arc::new(MemoryStore::new()).stores(Arc::new(MemoryFiles::new()));
//! let commerce = Commerce::new(stores, CommerceConfig::default()).await?;
//! ```

mod checkout;
mod error;
mod store;
mod tables;

pub use error::SnapshotError;
pub use store::MemoryStore;
