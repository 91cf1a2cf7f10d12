//! Newtype IDs for type-safe identifiers.
//!
//! Using newtypes prevents accidentally mixing up different ID types,
//! e.g., passing a CartId where an OrderId is expected. Zero means "not yet
//! stored".

use shopkeep_entity::define_id;

define_id!(
    /// Identifier of an account.
    AccountId
);
define_id!(
    /// Identifier of a shipping address.
    AddressId
);
define_id!(
    /// Identifier of a stored payment method.
    PaymentMethodId
);
define_id!(
    /// Identifier of a product.
    ProductId
);
define_id!(
    /// Identifier of a purchasable product item (one SKU).
    ProductItemId
);
define_id!(
    /// Identifier of a shipping method.
    ShippingMethodId
);
define_id!(
    /// Identifier of an order status.
    OrderStatusId
);
define_id!(
    /// Identifier of a cart.
    CartId
);
define_id!(
    /// Identifier of a cart line.
    CartItemId
);
define_id!(
    /// Identifier of an order.
    OrderId
);
