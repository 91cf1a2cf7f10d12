//! Cart-to-order transition.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use shopkeep_commerce::checkout::{
    CheckoutPort, CheckoutReceipt, CheckoutRequest, OrderForm, OrderLine,
};
use shopkeep_commerce::ids::{AccountId, OrderId};
use shopkeep_commerce::money::Money;
use shopkeep_entity::{EntityId, Form, Slot, StoreError};
use tracing::{info, instrument};

use crate::store::MemoryStore;
use crate::tables::{Table, Tables};

/// Kinds checkout reads or writes.
const CHECKOUT_KINDS: &[&str] = &[
    "cart",
    "cart item",
    "product item",
    "payment method",
    "address",
    "shipping method",
    "order status",
    "order",
];

/// What checkout will write, computed from one consistent view of the tables.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CheckoutPlan {
    pub account: AccountId,
    pub lines: Vec<OrderLine>,
    pub total: Money,
}

fn missing<F: Form>(id: F::Id) -> StoreError {
    StoreError::not_found(F::KIND, id)
}

fn row<'a, F: Table>(tables: &'a Tables, id: F::Id) -> Result<&'a F, StoreError> {
    F::rows(tables).get(&id.raw()).ok_or_else(|| missing::<F>(id))
}

fn overflow() -> StoreError {
    StoreError::Transient("order total overflows".to_string())
}

/// Snapshot the cart: lines in line order at current prices, plus shipping.
pub(crate) fn plan_checkout(
    tables: &Tables,
    request: &CheckoutRequest,
) -> Result<CheckoutPlan, StoreError> {
    use shopkeep_commerce::account::{AddressForm, PaymentMethodForm};
    use shopkeep_commerce::cart::CartForm;
    use shopkeep_commerce::catalog::{ProductItemForm, ShippingMethodForm};
    use shopkeep_commerce::checkout::OrderStatusForm;

    let cart = row::<CartForm>(tables, request.cart)?;
    let account = cart
        .account
        .link_id()
        .ok_or_else(|| StoreError::Transient(format!("cart {} has no account", request.cart)))?;

    let payment = row::<PaymentMethodForm>(tables, request.payment_method)?;
    if payment.account.link_id() != Some(account) {
        return Err(StoreError::Validation(format!(
            "payment method {} does not belong to account {}",
            request.payment_method, account
        )));
    }
    let address = row::<AddressForm>(tables, request.address)?;
    if address.account.link_id() != Some(account) {
        return Err(StoreError::Validation(format!(
            "address {} does not belong to account {}",
            request.address, account
        )));
    }
    let shipping = row::<ShippingMethodForm>(tables, request.shipping_method)?;
    row::<OrderStatusForm>(tables, request.initial_status)?;

    let mut lines = Vec::new();
    let mut total = Money::zero(request.currency);
    for item in tables
        .cart_items
        .values()
        .filter(|item| item.cart.link_id() == Some(request.cart))
    {
        let item_id = item
            .product_item
            .link_id()
            .ok_or_else(|| StoreError::Transient(format!("cart item {} has no product item", item.id)))?;
        let product_item = row::<ProductItemForm>(tables, item_id)?;
        let unit_price = *product_item
            .price
            .value()
            .ok_or_else(|| StoreError::Transient(format!("product item {} has no price", item_id)))?;
        if unit_price.currency != request.currency {
            return Err(StoreError::Validation(format!(
                "product item {} is priced in {}, checkout is in {}",
                item_id, unit_price.currency, request.currency
            )));
        }
        let quantity = item.quantity.value().copied().unwrap_or_default();
        let line = OrderLine {
            product_item: item_id,
            quantity,
            unit_price,
            attributes: item.attributes.value().cloned().unwrap_or_default(),
        };
        let subtotal = line.subtotal().ok_or_else(overflow)?;
        total = total.checked_add(&subtotal).ok_or_else(overflow)?;
        lines.push(line);
    }
    if request.require_lines && lines.is_empty() {
        return Err(StoreError::Validation(format!("cart {} is empty", request.cart)));
    }

    let shipping_price = shipping
        .price
        .value()
        .copied()
        .unwrap_or_else(|| Money::zero(request.currency));
    if shipping_price.currency != request.currency {
        return Err(StoreError::Validation(format!(
            "shipping method {} is priced in {}, checkout is in {}",
            request.shipping_method, shipping_price.currency, request.currency
        )));
    }
    total = total.checked_add(&shipping_price).ok_or_else(overflow)?;

    Ok(CheckoutPlan {
        account,
        lines,
        total,
    })
}

/// Write the order and drop the cart with its lines.
pub(crate) fn commit_checkout(
    tables: &mut Tables,
    request: &CheckoutRequest,
    plan: CheckoutPlan,
    date: NaiveDate,
) -> Result<CheckoutReceipt, StoreError> {
    use shopkeep_commerce::cart::CartForm;

    let order_id = OrderId::new(tables.next_id());
    let line_count = plan.lines.len();
    let mut order = OrderForm {
        id: order_id,
        account: Slot::link(plan.account),
        date: Slot::Value(date),
        total: Slot::Value(plan.total),
        lines: Slot::Value(plan.lines),
        comment: Slot::from_option(request.comment.clone()),
        payment_method: Slot::link(request.payment_method),
        address: Slot::link(request.address),
        shipping_method: Slot::link(request.shipping_method),
        status: Slot::link(request.initial_status),
        ..Default::default()
    };
    order.settle();
    order.check(tables)?;
    tables.allocate();
    tables.orders.insert(order_id.raw(), order);

    CartForm::cascade(request.cart.raw(), tables);
    tables.carts.remove(&request.cart.raw());

    Ok(CheckoutReceipt {
        order_id,
        account_id: plan.account,
        date,
        total: plan.total,
        line_count,
    })
}

#[async_trait]
impl CheckoutPort for MemoryStore {
    #[instrument(skip(self, request), fields(cart = %request.cart))]
    async fn checkout(&self, request: &CheckoutRequest) -> Result<CheckoutReceipt, StoreError> {
        request.validate()?;
        let date = Utc::now().date_naive();
        let receipt = self
            .transaction(|tables| {
                for kind in CHECKOUT_KINDS {
                    tables.ensure_ready(kind)?;
                }
                let plan = plan_checkout(tables, request)?;
                commit_checkout(tables, request, plan, date)
            })
            .await?;
        info!(order = %receipt.order_id, total = %receipt.total, "cart converted to order");
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopkeep_commerce::account::{AccountForm, AddressForm, PaymentMethodForm};
    use shopkeep_commerce::cart::{CartForm, CartItemForm};
    use shopkeep_commerce::catalog::{ProductItemForm, ShippingMethodForm};
    use shopkeep_commerce::checkout::OrderStatusForm;
    use shopkeep_commerce::ids::*;
    use shopkeep_commerce::money::Currency;

    fn usd(amount: i64) -> Money {
        Money::new(amount, Currency::USD)
    }

    /// Account 1 with payment 2, address 3, shipping 4 (7.00), status 5,
    /// items 6 (10.00) and 7 (5.00), cart 8 with lines 9 (x2) and 10 (x1).
    fn seeded() -> (Tables, CheckoutRequest) {
        let mut t = Tables::default();
        for _ in 0..10 {
            t.allocate();
        }
        t.accounts.insert(
            1,
            AccountForm {
                id: AccountId::new(1),
                email: Slot::Value("ada@example.com".into()),
                display_name: Slot::Value("Ada".into()),
                created_at: Slot::Value(Utc::now()),
            },
        );
        t.payment_methods.insert(
            2,
            PaymentMethodForm {
                id: PaymentMethodId::new(2),
                provider: Slot::Value("card".into()),
                label: Slot::Value("Visa".into()),
                account: Slot::link(AccountId::new(1)),
            },
        );
        t.addresses.insert(
            3,
            AddressForm {
                id: AddressId::new(3),
                recipient: Slot::Value("Ada".into()),
                street: Slot::Value("1 Main St".into()),
                city: Slot::Value("Springfield".into()),
                postal_code: Slot::Value("12345".into()),
                country: Slot::Value("US".into()),
                phone: Slot::Null,
                account: Slot::link(AccountId::new(1)),
            },
        );
        t.shipping_methods.insert(
            4,
            ShippingMethodForm {
                id: ShippingMethodId::new(4),
                name: Slot::Value("Courier".into()),
                price: Slot::Value(usd(700)),
                delivery_days: Slot::Null,
            },
        );
        t.order_statuses.insert(
            5,
            OrderStatusForm {
                id: OrderStatusId::new(5),
                name: Slot::Value("new".into()),
                is_final: Slot::Value(false),
            },
        );
        for (id, sku, price) in [(6, "MUG", 1000), (7, "CAP", 500)] {
            t.product_items.insert(
                id,
                ProductItemForm {
                    id: ProductItemId::new(id),
                    sku: Slot::Value(sku.into()),
                    price: Slot::Value(usd(price)),
                    stock: Slot::Value(10),
                    product: Slot::link(ProductId::new(99)),
                },
            );
        }
        t.carts.insert(
            8,
            CartForm {
                id: CartId::new(8),
                created_at: Slot::Value(Utc::now()),
                account: Slot::link(AccountId::new(1)),
            },
        );
        for (id, item, quantity) in [(9, 6, 2), (10, 7, 1)] {
            t.cart_items.insert(
                id,
                CartItemForm {
                    id: CartItemId::new(id),
                    quantity: Slot::Value(quantity),
                    attributes: Slot::Value(Vec::new()),
                    cart: Slot::link(CartId::new(8)),
                    product_item: Slot::link(ProductItemId::new(item)),
                },
            );
        }
        let request = CheckoutRequest::new(
            CartId::new(8),
            PaymentMethodId::new(2),
            AddressId::new(3),
            ShippingMethodId::new(4),
        )
        .with_status(OrderStatusId::new(5));
        (t, request)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn test_plan_totals_lines_and_shipping() {
        let (tables, request) = seeded();
        let plan = plan_checkout(&tables, &request).unwrap();

        assert_eq!(plan.account, AccountId::new(1));
        assert_eq!(plan.total, usd(3200));
        assert_eq!(plan.lines.len(), 2);
        assert_eq!(plan.lines[0].product_item, ProductItemId::new(6));
        assert_eq!(plan.lines[0].unit_price, usd(1000));
        assert_eq!(plan.lines[1].quantity, 1);
    }

    #[test]
    fn test_free_shipping_when_price_is_null() {
        let (mut tables, request) = seeded();
        tables.shipping_methods.get_mut(&4).unwrap().price = Slot::Null;
        let plan = plan_checkout(&tables, &request).unwrap();
        assert_eq!(plan.total, usd(2500));
    }

    #[test]
    fn test_price_change_after_plan_does_not_reach_order() {
        let (mut tables, request) = seeded();
        let plan = plan_checkout(&tables, &request).unwrap();

        tables.product_items.get_mut(&6).unwrap().price = Slot::Value(usd(99_999));
        let receipt = commit_checkout(&mut tables, &request, plan, today()).unwrap();

        assert_eq!(receipt.total, usd(3200));
        let order = &tables.orders[&receipt.order_id.raw()];
        assert_eq!(order.total, Slot::Value(usd(3200)));
        assert_eq!(
            order.lines.value().map(|lines| lines[0].unit_price),
            Some(usd(1000))
        );
    }

    #[test]
    fn test_commit_removes_cart_and_lines() {
        let (mut tables, request) = seeded();
        let plan = plan_checkout(&tables, &request).unwrap();
        let receipt = commit_checkout(&mut tables, &request, plan, today()).unwrap();

        assert_eq!(receipt.order_id, OrderId::new(11));
        assert_eq!(receipt.line_count, 2);
        assert_eq!(receipt.date, today());
        assert!(tables.carts.is_empty());
        assert!(tables.cart_items.is_empty());
        assert!(tables.orders[&11].delivery_date.is_null());
    }

    #[test]
    fn test_foreign_address_is_validation() {
        let (mut tables, request) = seeded();
        tables.addresses.get_mut(&3).unwrap().account = Slot::link(AccountId::new(42));
        assert!(plan_checkout(&tables, &request).unwrap_err().is_validation());
    }

    #[test]
    fn test_missing_rows_are_not_found() {
        let (tables, request) = seeded();

        let mut gone = request.clone();
        gone.cart = CartId::new(77);
        assert!(plan_checkout(&tables, &gone).unwrap_err().is_not_found());

        let mut gone = request.clone();
        gone.initial_status = OrderStatusId::new(77);
        assert!(plan_checkout(&tables, &gone).unwrap_err().is_not_found());
    }

    #[test]
    fn test_required_lines_checked_after_cart_resolves() {
        let (mut tables, request) = seeded();
        let strict = request.clone().with_lines_required(true);
        assert!(plan_checkout(&tables, &strict).is_ok());

        tables.cart_items.clear();
        assert!(plan_checkout(&tables, &strict).unwrap_err().is_validation());
        assert!(plan_checkout(&tables, &request).is_ok());

        tables.carts.clear();
        assert!(plan_checkout(&tables, &strict).unwrap_err().is_not_found());
    }

    #[test]
    fn test_currency_mismatch_is_validation() {
        let (tables, mut request) = seeded();
        request.currency = Currency::EUR;
        assert!(plan_checkout(&tables, &request).unwrap_err().is_validation());
    }

    #[test]
    fn test_overflow_is_transient() {
        let (mut tables, request) = seeded();
        tables.product_items.get_mut(&6).unwrap().price = Slot::Value(usd(i64::MAX));
        let err = plan_checkout(&tables, &request).unwrap_err();
        assert!(matches!(err, StoreError::Transient(_)));
    }
}
