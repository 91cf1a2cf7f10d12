//! Newtype identifiers.
//!
//! Every entity kind gets its own identifier type so an `OrderId` can never be
//! passed where a `CartId` is expected. Identifiers are `u64` and zero is the
//! "not yet assigned" sentinel: no stored row ever carries it.

use std::fmt;
use std::hash::Hash;

/// An entity identifier.
pub trait EntityId:
    Copy + Eq + Ord + Hash + Default + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// Wrap a raw value.
    fn from_raw(raw: u64) -> Self;

    /// The raw value.
    fn raw(self) -> u64;

    /// Whether the identifier refers to a stored row.
    fn is_assigned(self) -> bool {
        self.raw() != 0
    }
}

/// Generate a `u64` identifier newtype.
///
/// The generated type implements [`EntityId`], `Display`, serde (as a bare
/// number) and `From<u64>`.
///
/// # Example
///
/// ```rust,ignore
/// shopkeep_entity::define_id!(OrderId);
///
/// let id = OrderId::new(42);
/// assert!(id.is_assigned());
/// assert!(!OrderId::UNASSIGNED.is_assigned());
/// ```
#[macro_export]
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            Default,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// The "not yet assigned" sentinel.
            pub const UNASSIGNED: Self = Self(0);

            /// Create an identifier from its raw value.
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Get the raw value.
            pub const fn get(self) -> u64 {
                self.0
            }

            /// Whether the identifier refers to a stored row.
            pub const fn is_assigned(self) -> bool {
                self.0 != 0
            }
        }

        impl $crate::EntityId for $name {
            fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            fn raw(self) -> u64 {
                self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}
