//! Generic lazily-filled entity cache for Shopkeep.
//!
//! Every domain type is the same pattern instantiated over a different form:
//!
//! - **Form**: a partially-populated snapshot of one row, made of three-state
//!   [`Slot`]s, used both as a query result and as a patch
//! - **Repository**: the storage-facing port, one per entity kind
//! - **Entity**: a per-instance, lock-guarded cache of one row that fetches
//!   slots on demand and merges whatever the port returns
//! - **Collection**: a stateless lister/constructor that hands out
//!   pre-hydrated entities
//!
//! # Example
//!
//! ```rust,ignore
//! use shopkeep_entity::prelude::*;
//!
//! define_id!(ProductId);
//!
//! define_form! {
//!     pub struct ProductForm: "product" {
//!         id: ProductId,
//!         parent: (),
//!         field: ProductField,
//!         name: String => Name,
//!     }
//!     links {}
//! }
//!
//! let products = Collection::new(repository);
//! for product in products.list((), Page::new(0, 10)).await? {
//!     // Filled by the listing query; no round trip.
//!     let name = product.require(ProductField::Name, |f| &f.name).await?;
//!     println!("{}: {}", product.id(), name);
//! }
//! ```

mod collection;
mod entity;
mod error;
mod form;
mod id;
mod page;
mod repository;
mod slot;

#[cfg(test)]
mod test_support;

pub use collection::Collection;
pub use entity::Entity;
pub use error::StoreError;
pub use form::Form;
pub use id::EntityId;
pub use page::{Page, SortOrder};
pub use repository::{Repository, SharedRepository};
pub use slot::Slot;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        define_form, define_id, Collection, Entity, EntityId, Form, Page, Repository,
        SharedRepository, Slot, SortOrder, StoreError,
    };
}
