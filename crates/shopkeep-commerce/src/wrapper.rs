//! Shared shape of the typed wrappers.

/// Define a typed wrapper around `Entity<$form>` that carries the
/// collaborator bundle.
macro_rules! define_wrapper {
    ($(#[$meta:meta])* $name:ident($form:ty, $id:ty) via $repo:ident) => {
        $(#[$meta])*
        pub struct $name {
            entity: ::shopkeep_entity::Entity<$form>,
            stores: $crate::stores::Stores,
        }

        impl $name {
            pub fn from_entity(
                entity: ::shopkeep_entity::Entity<$form>,
                stores: $crate::stores::Stores,
            ) -> Self {
                Self { entity, stores }
            }

            /// Wrapper pre-filled with `form`, as returned by a listing or join.
            pub fn hydrated(form: $form, stores: &$crate::stores::Stores) -> Self {
                let repository = ::std::sync::Arc::clone(&stores.$repo);
                Self::from_entity(::shopkeep_entity::Entity::hydrated(form, repository), stores.clone())
            }

            /// Wrapper that knows only its identifier.
            pub fn lazy(id: $id, stores: &$crate::stores::Stores) -> Self {
                let repository = ::std::sync::Arc::clone(&stores.$repo);
                Self::from_entity(::shopkeep_entity::Entity::new(id, repository), stores.clone())
            }

            pub fn id(&self) -> $id {
                self.entity.id()
            }

            /// The generic cache underneath.
            pub fn entity(&self) -> &::shopkeep_entity::Entity<$form> {
                &self.entity
            }

            /// Everything cached so far.
            pub async fn snapshot(&self) -> $form {
                self.entity.snapshot().await
            }

            /// Delete the row.
            pub async fn delete(&self) -> $crate::error::Result<()> {
                self.entity.delete().await?;
                Ok(())
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("id", &self.entity.id())
                    .finish_non_exhaustive()
            }
        }
    };
}
