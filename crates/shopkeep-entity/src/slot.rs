//! Three-state attribute cells.

use serde::{Deserialize, Serialize};

use crate::{EntityId, Form};

/// One attribute of a [`Form`].
///
/// A slot is `Unknown` until some fetch determined it. `Null` means the store
/// was asked and holds no value, which is different from not having asked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slot<T> {
    /// Never fetched.
    Unknown,
    /// Fetched; the store holds no value.
    Null,
    /// Fetched; the store holds this value.
    Value(T),
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Slot::Unknown
    }
}

impl<T> Slot<T> {
    /// Build a known slot from an optional value.
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Slot::Value(v),
            None => Slot::Null,
        }
    }

    /// Check if some fetch determined this slot.
    pub fn is_known(&self) -> bool {
        !matches!(self, Slot::Unknown)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Slot::Unknown)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Slot::Null)
    }

    /// `None` if unknown, `Some(None)` if null, `Some(Some(v))` if present.
    pub fn known(&self) -> Option<Option<&T>> {
        match self {
            Slot::Unknown => None,
            Slot::Null => Some(None),
            Slot::Value(v) => Some(Some(v)),
        }
    }

    /// The present value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Slot::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Consume into the present value, if any.
    pub fn into_value(self) -> Option<T> {
        match self {
            Slot::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl<T: Clone> Slot<T> {
    /// Patch this slot with an incoming one.
    ///
    /// An unknown incoming slot never overwrites anything.
    pub fn merge(&mut self, incoming: &Slot<T>) {
        if incoming.is_known() {
            *self = incoming.clone();
        }
    }
}

impl<F: Form> Slot<F> {
    /// Patch a foreign reference with an incoming one.
    ///
    /// A reference whose identifier is unassigned counts as unknown. A
    /// reference to the row already cached merges into it field by field,
    /// keeping whatever the incoming form leaves unknown.
    pub fn merge_link(&mut self, incoming: &Slot<F>) {
        match incoming {
            Slot::Unknown => {}
            Slot::Null => *self = Slot::Null,
            Slot::Value(form) if !form.id().is_assigned() => {}
            Slot::Value(form) => match self {
                Slot::Value(cached) if cached.id() == form.id() => cached.apply(form),
                _ => *self = Slot::Value(form.clone()),
            },
        }
    }

    /// Identifier of the referenced row, if known.
    pub fn link_id(&self) -> Option<F::Id> {
        self.value().map(|form| form.id())
    }

    /// A reference slot carrying nothing but the identifier.
    pub fn link(id: F::Id) -> Self {
        Slot::Value(F::with_id(id))
    }
}

impl<T> From<T> for Slot<T> {
    fn from(value: T) -> Self {
        Slot::Value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unknown() {
        let slot: Slot<String> = Slot::default();
        assert!(slot.is_unknown());
        assert_eq!(slot.known(), None);
    }

    #[test]
    fn test_known_states() {
        let null: Slot<i64> = Slot::Null;
        assert_eq!(null.known(), Some(None));

        let present = Slot::Value(5);
        assert_eq!(present.known(), Some(Some(&5)));
        assert_eq!(present.value(), Some(&5));
    }

    #[test]
    fn test_merge_unknown_keeps_value() {
        let mut slot = Slot::Value("kept".to_string());
        slot.merge(&Slot::Unknown);
        assert_eq!(slot, Slot::Value("kept".to_string()));
    }

    #[test]
    fn test_merge_null_records_null() {
        let mut slot = Slot::Value("old".to_string());
        slot.merge(&Slot::Null);
        assert!(slot.is_null());
    }

    #[test]
    fn test_merge_value_overwrites() {
        let mut slot = Slot::Value(1);
        slot.merge(&Slot::Value(2));
        assert_eq!(slot, Slot::Value(2));
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Slot::from_option(Some(3)), Slot::Value(3));
        assert_eq!(Slot::<i32>::from_option(None), Slot::Null);
    }
}
