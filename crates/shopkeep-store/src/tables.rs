//! Row storage and per-kind constraints.
//!
//! Every stored row is complete (no unknown slots) and detached: its links
//! carry only the referenced identifier. Reads join the referenced rows back
//! in, one level deep.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use shopkeep_commerce::account::{AccountForm, AddressForm, PaymentMethodForm};
use shopkeep_commerce::cart::{validate_quantity, CartForm, CartItemForm};
use shopkeep_commerce::catalog::{ProductForm, ProductItemForm, ShippingMethodForm};
use shopkeep_commerce::checkout::{OrderForm, OrderStatusForm};
use shopkeep_commerce::ids::{AccountId, CartId, ProductId};
use shopkeep_entity::{EntityId, Form, Slot, StoreError};

/// Every table of the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tables {
    /// Last identifier handed out. Shared by every kind.
    last_id: u64,
    /// Kinds whose `init` has run.
    ready: BTreeSet<String>,
    pub accounts: BTreeMap<u64, AccountForm>,
    pub addresses: BTreeMap<u64, AddressForm>,
    pub payment_methods: BTreeMap<u64, PaymentMethodForm>,
    pub products: BTreeMap<u64, ProductForm>,
    pub product_items: BTreeMap<u64, ProductItemForm>,
    pub shipping_methods: BTreeMap<u64, ShippingMethodForm>,
    pub order_statuses: BTreeMap<u64, OrderStatusForm>,
    pub carts: BTreeMap<u64, CartForm>,
    pub cart_items: BTreeMap<u64, CartItemForm>,
    pub orders: BTreeMap<u64, OrderForm>,
}

impl Tables {
    /// The identifier the next insert will get.
    pub fn next_id(&self) -> u64 {
        self.last_id + 1
    }

    pub fn allocate(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    /// Returns `false` if the kind was already initialized.
    pub fn mark_ready(&mut self, kind: &str) -> bool {
        self.ready.insert(kind.to_string())
    }

    pub fn ensure_ready(&self, kind: &str) -> Result<(), StoreError> {
        if self.ready.contains(kind) {
            Ok(())
        } else {
            Err(StoreError::Transient(format!("{} table is not initialized", kind)))
        }
    }
}

/// A form kind with a table in [`Tables`].
pub trait Table: Form {
    fn rows(tables: &Tables) -> &BTreeMap<u64, Self>;

    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<u64, Self>;

    /// Parent of a stored row.
    fn owner(&self) -> Option<Self::Parent>;

    /// Listing order. Ends with the identifier.
    fn sort_key(&self) -> (i64, u64) {
        (0, self.id().raw())
    }

    /// Reduce every link to its identifier.
    fn detach(&mut self) {}

    /// Replace every link with the referenced row.
    fn join(&mut self, _tables: &Tables) {}

    /// Constraints a complete row must meet before it is written.
    fn check(&self, tables: &Tables) -> Result<(), StoreError>;

    /// Whether rows of other kinds still point at `id`.
    fn referenced(_id: u64, _tables: &Tables) -> bool {
        false
    }

    /// Remove the rows owned by `id`.
    fn cascade(_id: u64, _tables: &mut Tables) {}
}

fn required<'a, T>(slot: &'a Slot<T>, kind: &str, what: &str) -> Result<&'a T, StoreError> {
    slot.value()
        .ok_or_else(|| StoreError::Validation(format!("{} {} is required", kind, what)))
}

fn reference<C: Table>(slot: &Slot<C>, tables: &Tables) -> Result<(), StoreError> {
    match slot.link_id() {
        Some(id) if !id.is_assigned() => Err(StoreError::unassigned(C::KIND)),
        Some(id) if C::rows(tables).contains_key(&id.raw()) => Ok(()),
        Some(id) => Err(StoreError::Validation(format!(
            "{} {} does not exist",
            C::KIND,
            id
        ))),
        None => Err(StoreError::Validation(format!("{} reference is required", C::KIND))),
    }
}

fn detach_link<C: Form>(slot: &mut Slot<C>) {
    if let Some(id) = slot.link_id() {
        *slot = Slot::link(id);
    }
}

fn join_link<C: Table>(slot: &mut Slot<C>, tables: &Tables) {
    let row = slot
        .link_id()
        .and_then(|id| C::rows(tables).get(&id.raw()))
        .cloned();
    if let Some(row) = row {
        *slot = Slot::Value(row);
    }
}

fn points_at<C: Form>(slot: &Slot<C>, id: u64) -> bool {
    slot.link_id().map(EntityId::raw) == Some(id)
}

impl Table for AccountForm {
    fn rows(tables: &Tables) -> &BTreeMap<u64, Self> {
        &tables.accounts
    }

    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<u64, Self> {
        &mut tables.accounts
    }

    fn owner(&self) -> Option<()> {
        Some(())
    }

    fn check(&self, tables: &Tables) -> Result<(), StoreError> {
        let email = required(&self.email, Self::KIND, "email")?;
        required(&self.display_name, Self::KIND, "display name")?;
        required(&self.created_at, Self::KIND, "creation time")?;
        let taken = tables
            .accounts
            .values()
            .any(|other| other.id != self.id && other.email.value() == Some(email));
        if taken {
            return Err(StoreError::Duplicate(format!("account email {}", email)));
        }
        Ok(())
    }

    fn referenced(id: u64, tables: &Tables) -> bool {
        tables.addresses.values().any(|row| points_at(&row.account, id))
            || tables.payment_methods.values().any(|row| points_at(&row.account, id))
            || tables.carts.values().any(|row| points_at(&row.account, id))
            || tables.orders.values().any(|row| points_at(&row.account, id))
    }
}

impl Table for AddressForm {
    fn rows(tables: &Tables) -> &BTreeMap<u64, Self> {
        &tables.addresses
    }

    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<u64, Self> {
        &mut tables.addresses
    }

    fn owner(&self) -> Option<AccountId> {
        self.account.link_id()
    }

    fn detach(&mut self) {
        detach_link(&mut self.account);
    }

    fn join(&mut self, tables: &Tables) {
        join_link(&mut self.account, tables);
    }

    fn check(&self, tables: &Tables) -> Result<(), StoreError> {
        required(&self.recipient, Self::KIND, "recipient")?;
        required(&self.street, Self::KIND, "street")?;
        required(&self.city, Self::KIND, "city")?;
        required(&self.postal_code, Self::KIND, "postal code")?;
        required(&self.country, Self::KIND, "country")?;
        reference(&self.account, tables)
    }

    fn referenced(id: u64, tables: &Tables) -> bool {
        tables.orders.values().any(|row| points_at(&row.address, id))
    }
}

impl Table for PaymentMethodForm {
    fn rows(tables: &Tables) -> &BTreeMap<u64, Self> {
        &tables.payment_methods
    }

    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<u64, Self> {
        &mut tables.payment_methods
    }

    fn owner(&self) -> Option<AccountId> {
        self.account.link_id()
    }

    fn detach(&mut self) {
        detach_link(&mut self.account);
    }

    fn join(&mut self, tables: &Tables) {
        join_link(&mut self.account, tables);
    }

    fn check(&self, tables: &Tables) -> Result<(), StoreError> {
        required(&self.provider, Self::KIND, "provider")?;
        required(&self.label, Self::KIND, "label")?;
        reference(&self.account, tables)
    }

    fn referenced(id: u64, tables: &Tables) -> bool {
        tables
            .orders
            .values()
            .any(|row| points_at(&row.payment_method, id))
    }
}

impl Table for ProductForm {
    fn rows(tables: &Tables) -> &BTreeMap<u64, Self> {
        &tables.products
    }

    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<u64, Self> {
        &mut tables.products
    }

    fn owner(&self) -> Option<()> {
        Some(())
    }

    fn check(&self, _tables: &Tables) -> Result<(), StoreError> {
        required(&self.name, Self::KIND, "name")?;
        required(&self.created_at, Self::KIND, "creation time")?;
        Ok(())
    }

    fn referenced(id: u64, tables: &Tables) -> bool {
        tables.product_items.values().any(|row| points_at(&row.product, id))
    }
}

impl Table for ProductItemForm {
    fn rows(tables: &Tables) -> &BTreeMap<u64, Self> {
        &tables.product_items
    }

    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<u64, Self> {
        &mut tables.product_items
    }

    fn owner(&self) -> Option<ProductId> {
        self.product.link_id()
    }

    fn detach(&mut self) {
        detach_link(&mut self.product);
    }

    fn join(&mut self, tables: &Tables) {
        join_link(&mut self.product, tables);
    }

    fn check(&self, tables: &Tables) -> Result<(), StoreError> {
        let sku = required(&self.sku, Self::KIND, "sku")?;
        required(&self.price, Self::KIND, "price")?;
        let stock = required(&self.stock, Self::KIND, "stock")?;
        if *stock < 0 {
            return Err(StoreError::Validation(format!("stock {} is negative", stock)));
        }
        reference(&self.product, tables)?;
        let taken = tables
            .product_items
            .values()
            .any(|other| other.id != self.id && other.sku.value() == Some(sku));
        if taken {
            return Err(StoreError::Duplicate(format!("sku {}", sku)));
        }
        Ok(())
    }

    fn referenced(id: u64, tables: &Tables) -> bool {
        tables
            .cart_items
            .values()
            .any(|row| points_at(&row.product_item, id))
    }
}

impl Table for ShippingMethodForm {
    fn rows(tables: &Tables) -> &BTreeMap<u64, Self> {
        &tables.shipping_methods
    }

    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<u64, Self> {
        &mut tables.shipping_methods
    }

    fn owner(&self) -> Option<()> {
        Some(())
    }

    fn check(&self, _tables: &Tables) -> Result<(), StoreError> {
        required(&self.name, Self::KIND, "name")?;
        Ok(())
    }

    fn referenced(id: u64, tables: &Tables) -> bool {
        tables
            .orders
            .values()
            .any(|row| points_at(&row.shipping_method, id))
    }
}

impl Table for OrderStatusForm {
    fn rows(tables: &Tables) -> &BTreeMap<u64, Self> {
        &tables.order_statuses
    }

    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<u64, Self> {
        &mut tables.order_statuses
    }

    fn owner(&self) -> Option<()> {
        Some(())
    }

    fn check(&self, _tables: &Tables) -> Result<(), StoreError> {
        required(&self.name, Self::KIND, "name")?;
        required(&self.is_final, Self::KIND, "final flag")?;
        Ok(())
    }

    fn referenced(id: u64, tables: &Tables) -> bool {
        tables.orders.values().any(|row| points_at(&row.status, id))
    }
}

impl Table for CartForm {
    fn rows(tables: &Tables) -> &BTreeMap<u64, Self> {
        &tables.carts
    }

    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<u64, Self> {
        &mut tables.carts
    }

    fn owner(&self) -> Option<AccountId> {
        self.account.link_id()
    }

    fn detach(&mut self) {
        detach_link(&mut self.account);
    }

    fn join(&mut self, tables: &Tables) {
        join_link(&mut self.account, tables);
    }

    fn check(&self, tables: &Tables) -> Result<(), StoreError> {
        required(&self.created_at, Self::KIND, "creation time")?;
        reference(&self.account, tables)
    }

    fn cascade(id: u64, tables: &mut Tables) {
        tables.cart_items.retain(|_, row| !points_at(&row.cart, id));
    }
}

impl Table for CartItemForm {
    fn rows(tables: &Tables) -> &BTreeMap<u64, Self> {
        &tables.cart_items
    }

    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<u64, Self> {
        &mut tables.cart_items
    }

    fn owner(&self) -> Option<CartId> {
        self.cart.link_id()
    }

    fn detach(&mut self) {
        detach_link(&mut self.cart);
        detach_link(&mut self.product_item);
    }

    fn join(&mut self, tables: &Tables) {
        join_link(&mut self.cart, tables);
        join_link(&mut self.product_item, tables);
    }

    fn check(&self, tables: &Tables) -> Result<(), StoreError> {
        validate_quantity(*required(&self.quantity, Self::KIND, "quantity")?)?;
        reference(&self.cart, tables)?;
        reference(&self.product_item, tables)
    }
}

impl Table for OrderForm {
    fn rows(tables: &Tables) -> &BTreeMap<u64, Self> {
        &tables.orders
    }

    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<u64, Self> {
        &mut tables.orders
    }

    fn owner(&self) -> Option<AccountId> {
        self.account.link_id()
    }

    /// Order date, then identifier.
    fn sort_key(&self) -> (i64, u64) {
        let day = self
            .date
            .value()
            .map(|date| i64::from(date.num_days_from_ce()))
            .unwrap_or_default();
        (day, self.id.raw())
    }

    fn detach(&mut self) {
        detach_link(&mut self.account);
        detach_link(&mut self.payment_method);
        detach_link(&mut self.address);
        detach_link(&mut self.shipping_method);
        detach_link(&mut self.status);
    }

    fn join(&mut self, tables: &Tables) {
        join_link(&mut self.account, tables);
        join_link(&mut self.payment_method, tables);
        join_link(&mut self.address, tables);
        join_link(&mut self.shipping_method, tables);
        join_link(&mut self.status, tables);
    }

    fn check(&self, tables: &Tables) -> Result<(), StoreError> {
        required(&self.date, Self::KIND, "date")?;
        required(&self.total, Self::KIND, "total")?;
        for line in required(&self.lines, Self::KIND, "lines")? {
            validate_quantity(line.quantity)?;
        }
        reference(&self.account, tables)?;
        reference(&self.payment_method, tables)?;
        reference(&self.address, tables)?;
        reference(&self.shipping_method, tables)?;
        reference(&self.status, tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use shopkeep_commerce::ids::OrderId;
    use shopkeep_commerce::money::{Currency, Money};

    fn with_account(tables: &mut Tables, email: &str) -> u64 {
        let id = tables.allocate();
        tables.accounts.insert(
            id,
            AccountForm {
                id: AccountId::new(id),
                email: Slot::Value(email.to_string()),
                display_name: Slot::Value("Ada".to_string()),
                created_at: Slot::Value(Utc::now()),
            },
        );
        id
    }

    #[test]
    fn test_ids_are_shared_across_kinds() {
        let mut tables = Tables::default();
        assert_eq!(tables.next_id(), 1);
        assert_eq!(tables.allocate(), 1);
        assert_eq!(tables.allocate(), 2);
        assert_eq!(tables.next_id(), 3);
    }

    #[test]
    fn test_ready_tracking() {
        let mut tables = Tables::default();
        assert!(tables.ensure_ready("cart").is_err());
        assert!(tables.mark_ready("cart"));
        assert!(!tables.mark_ready("cart"));
        assert!(tables.ensure_ready("cart").is_ok());
    }

    #[test]
    fn test_duplicate_email_ignores_own_row() {
        let mut tables = Tables::default();
        let id = with_account(&mut tables, "ada@example.com");

        let own = tables.accounts[&id].clone();
        assert!(own.check(&tables).is_ok());

        let mut other = own.clone();
        other.id = AccountId::new(99);
        assert!(other.check(&tables).unwrap_err().is_duplicate());
    }

    #[test]
    fn test_missing_reference_is_validation() {
        let tables = Tables::default();
        let cart = CartForm {
            created_at: Slot::Value(Utc::now()),
            account: Slot::link(AccountId::new(7)),
            ..Default::default()
        };
        assert!(cart.check(&tables).unwrap_err().is_validation());
    }

    #[test]
    fn test_join_and_detach() {
        let mut tables = Tables::default();
        let account = with_account(&mut tables, "ada@example.com");

        let mut cart = CartForm {
            account: Slot::link(AccountId::new(account)),
            ..Default::default()
        };
        cart.join(&tables);
        assert_eq!(
            cart.account.value().and_then(|a| a.email.value()).map(String::as_str),
            Some("ada@example.com")
        );

        cart.detach();
        assert_eq!(cart.account, Slot::link(AccountId::new(account)));
    }

    #[test]
    fn test_orders_sort_by_date_then_id() {
        let early = OrderForm {
            id: OrderId::new(9),
            date: Slot::Value(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            total: Slot::Value(Money::zero(Currency::USD)),
            ..Default::default()
        };
        let late = OrderForm {
            id: OrderId::new(2),
            date: Slot::Value(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()),
            ..Default::default()
        };
        assert!(early.sort_key() < late.sort_key());
    }

    #[test]
    fn test_cart_cascade_removes_its_lines() {
        let mut tables = Tables::default();
        for (line, cart) in [(10, 1), (11, 1), (12, 2)] {
            tables.cart_items.insert(
                line,
                CartItemForm {
                    cart: Slot::link(CartId::new(cart)),
                    ..Default::default()
                },
            );
        }
        CartForm::cascade(1, &mut tables);
        assert_eq!(tables.cart_items.keys().copied().collect::<Vec<_>>(), vec![12]);
    }
}
