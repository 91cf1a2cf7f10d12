//! Partially-populated entity snapshots.
//!
//! A form is the unit that crosses the persistence port in both directions:
//! stores answer fetches with forms, and callers send forms as patches. Forms
//! are plain data. Cloning one takes an independent snapshot.

use std::fmt;
use std::hash::Hash;

use crate::EntityId;

/// A partially-populated snapshot of one entity's attributes.
///
/// Implemented by [`define_form!`](crate::define_form); hand-written
/// implementations must keep [`Form::apply`] idempotent.
pub trait Form: Clone + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Identifier type of the entity kind.
    type Id: EntityId;
    /// One variant per slot.
    type Field: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static;
    /// Key that child listings and counts are scoped by (`()` for top-level kinds).
    type Parent: Copy + PartialEq + fmt::Debug + Send + Sync + 'static;

    /// Human-readable kind name, used in errors and logs.
    const KIND: &'static str;

    /// Every field of the kind.
    fn fields() -> &'static [Self::Field];

    fn id(&self) -> Self::Id;

    /// An empty form for one identifier.
    fn with_id(id: Self::Id) -> Self;

    /// Merge a patch into this form.
    ///
    /// The identifier is only taken when assigned, unknown slots never
    /// overwrite, and references to the same row merge recursively.
    fn apply(&mut self, patch: &Self);

    /// Check if the slot for `field` has been determined.
    fn is_known(&self, field: Self::Field) -> bool;

    /// Reset one slot to unknown.
    fn forget(&mut self, field: Self::Field);

    /// A form holding only the identifier and the slot for `field`.
    fn project(&self, field: Self::Field) -> Self;

    /// Mark every unknown slot as null. Stores call this on rows they create.
    fn settle(&mut self);
}

/// Define a form struct, its field enum, and its [`Form`] implementation.
///
/// Plain slots go in the main block; foreign references, whose slots hold the
/// referenced kind's own form, go in the `links` block.
///
/// # Example
///
/// ```rust,ignore
/// shopkeep_entity::define_form! {
///     /// A product item.
///     pub struct ItemForm: "item" {
///         id: ItemId,
///         parent: ProductId,
///         field: ItemField,
///         sku: String => Sku,
///         price: Money => Price,
///     }
///     links {
///         product: ProductForm => Product,
///     }
/// }
/// ```
#[macro_export]
macro_rules! define_form {
    (
        $(#[$meta:meta])*
        pub struct $form:ident : $kind:literal {
            id: $id:ty,
            parent: $parent:ty,
            field: $field:ident,
            $( $(#[$fmeta:meta])* $name:ident : $ty:ty => $variant:ident, )*
        }
        links {
            $( $(#[$lmeta:meta])* $lname:ident : $lty:ty => $lvariant:ident, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        pub struct $form {
            /// Row identifier; unassigned until stored.
            pub id: $id,
            $( $(#[$fmeta])* pub $name: $crate::Slot<$ty>, )*
            $( $(#[$lmeta])* pub $lname: $crate::Slot<$lty>, )*
        }

        #[doc = concat!("Fields of [`", stringify!($form), "`].")]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $field {
            $( $variant, )*
            $( $lvariant, )*
        }

        impl $crate::Form for $form {
            type Id = $id;
            type Field = $field;
            type Parent = $parent;

            const KIND: &'static str = $kind;

            fn fields() -> &'static [$field] {
                &[$( $field::$variant, )* $( $field::$lvariant, )*]
            }

            fn id(&self) -> $id {
                self.id
            }

            fn with_id(id: $id) -> Self {
                Self {
                    id,
                    ..Default::default()
                }
            }

            fn apply(&mut self, patch: &Self) {
                if $crate::EntityId::is_assigned(patch.id) {
                    self.id = patch.id;
                }
                $( self.$name.merge(&patch.$name); )*
                $( self.$lname.merge_link(&patch.$lname); )*
            }

            fn is_known(&self, field: $field) -> bool {
                match field {
                    $( $field::$variant => self.$name.is_known(), )*
                    $( $field::$lvariant => self.$lname.is_known(), )*
                }
            }

            fn forget(&mut self, field: $field) {
                match field {
                    $( $field::$variant => self.$name = $crate::Slot::Unknown, )*
                    $( $field::$lvariant => self.$lname = $crate::Slot::Unknown, )*
                }
            }

            fn project(&self, field: $field) -> Self {
                let mut form = <Self as $crate::Form>::with_id(self.id);
                match field {
                    $( $field::$variant => form.$name = self.$name.clone(), )*
                    $( $field::$lvariant => form.$lname = self.$lname.clone(), )*
                }
                form
            }

            fn settle(&mut self) {
                $( if self.$name.is_unknown() { self.$name = $crate::Slot::Null; } )*
                $( if self.$lname.is_unknown() { self.$lname = $crate::Slot::Null; } )*
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::test_support::{GadgetForm, GadgetId, WidgetField, WidgetForm, WidgetId};
    use crate::{Form, Slot};

    fn widget(id: u64) -> WidgetForm {
        WidgetForm::with_id(WidgetId::new(id))
    }

    #[test]
    fn test_apply_is_idempotent() {
        let mut patch = widget(1);
        patch.name = Slot::Value("bolt".to_string());
        patch.note = Slot::Null;
        patch.gadget = Slot::Value(GadgetForm {
            id: GadgetId::new(9),
            label: Slot::Value("g".to_string()),
        });

        let mut once = widget(1);
        once.apply(&patch);
        let mut twice = once.clone();
        twice.apply(&patch);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_unknown_slots_never_clear() {
        let mut cached = widget(1);
        cached.name = Slot::Value("bolt".to_string());

        cached.apply(&widget(1));
        assert_eq!(cached.name, Slot::Value("bolt".to_string()));
    }

    #[test]
    fn test_unassigned_id_is_ignored() {
        let mut cached = widget(3);
        let mut patch = WidgetForm::default();
        patch.name = Slot::Value("nut".to_string());

        cached.apply(&patch);
        assert_eq!(cached.id, WidgetId::new(3));
        assert_eq!(cached.name, Slot::Value("nut".to_string()));
    }

    #[test]
    fn test_link_to_same_row_merges() {
        let mut cached = widget(1);
        cached.gadget = Slot::Value(GadgetForm {
            id: GadgetId::new(9),
            label: Slot::Value("kept".to_string()),
        });

        let mut patch = widget(1);
        patch.gadget = Slot::link(GadgetId::new(9));
        cached.apply(&patch);

        let gadget = cached.gadget.value().cloned().unwrap_or_default();
        assert_eq!(gadget.label, Slot::Value("kept".to_string()));
    }

    #[test]
    fn test_link_to_other_row_replaces() {
        let mut cached = widget(1);
        cached.gadget = Slot::Value(GadgetForm {
            id: GadgetId::new(9),
            label: Slot::Value("old".to_string()),
        });

        let mut patch = widget(1);
        patch.gadget = Slot::link(GadgetId::new(10));
        cached.apply(&patch);

        assert_eq!(cached.gadget.link_id(), Some(GadgetId::new(10)));
        let gadget = cached.gadget.value().cloned().unwrap_or_default();
        assert!(gadget.label.is_unknown());
    }

    #[test]
    fn test_unassigned_link_is_ignored() {
        let mut cached = widget(1);
        cached.gadget = Slot::link(GadgetId::new(9));

        let mut patch = widget(1);
        patch.gadget = Slot::Value(GadgetForm::default());
        cached.apply(&patch);

        assert_eq!(cached.gadget.link_id(), Some(GadgetId::new(9)));
    }

    #[test]
    fn test_project_keeps_one_slot() {
        let mut full = widget(4);
        full.name = Slot::Value("gear".to_string());
        full.note = Slot::Value("spare".to_string());

        let projected = full.project(WidgetField::Name);
        assert_eq!(projected.id, WidgetId::new(4));
        assert!(projected.is_known(WidgetField::Name));
        assert!(!projected.is_known(WidgetField::Note));
    }

    #[test]
    fn test_forget_resets_slot() {
        let mut form = widget(4);
        form.note = Slot::Null;
        form.forget(WidgetField::Note);
        assert!(form.note.is_unknown());
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut source = widget(2);
        source.name = Slot::Value("a".to_string());
        let snapshot = source.clone();

        source.name = Slot::Value("b".to_string());
        assert_eq!(snapshot.name, Slot::Value("a".to_string()));
    }

    #[test]
    fn test_settle_nulls_unknown_slots() {
        let mut form = widget(5);
        form.name = Slot::Value("kept".to_string());
        form.settle();

        assert_eq!(form.name, Slot::Value("kept".to_string()));
        assert!(form.note.is_null());
        assert!(form.gadget.is_null());
    }

    #[test]
    fn test_fields_lists_every_slot() {
        assert_eq!(WidgetForm::fields().len(), 3);
    }
}
