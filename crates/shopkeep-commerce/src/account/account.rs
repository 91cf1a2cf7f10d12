//! Accounts.

use chrono::{DateTime, Utc};
use shopkeep_entity::{define_form, Page, Slot};
use tracing::{info, instrument};

use crate::account::{Address, AddressDetails, PaymentMethod, PaymentMethodForm};
use crate::cart::{Cart, CartForm};
use crate::checkout::Order;
use crate::error::Result;
use crate::ids::AccountId;
use crate::stores::Stores;

define_form! {
    /// Stored attributes of an account.
    pub struct AccountForm: "account" {
        id: AccountId,
        parent: (),
        field: AccountField,
        /// Unique across accounts.
        email: String => Email,
        display_name: String => DisplayName,
        created_at: DateTime<Utc> => CreatedAt,
    }
    links {}
}

define_wrapper!(
    /// A customer account and the entry point to everything it owns.
    Account(AccountForm, AccountId) via accounts
);

impl Account {
    pub async fn email(&self) -> Result<String> {
        Ok(self.entity.require(AccountField::Email, |f| &f.email).await?)
    }

    pub async fn set_email(&self, email: impl Into<String>) -> Result<()> {
        let patch = AccountForm {
            email: Slot::Value(email.into()),
            ..Default::default()
        };
        self.entity.set(patch).await?;
        Ok(())
    }

    pub async fn display_name(&self) -> Result<String> {
        Ok(self
            .entity
            .require(AccountField::DisplayName, |f| &f.display_name)
            .await?)
    }

    pub async fn set_display_name(&self, name: impl Into<String>) -> Result<()> {
        let patch = AccountForm {
            display_name: Slot::Value(name.into()),
            ..Default::default()
        };
        self.entity.set(patch).await?;
        Ok(())
    }

    pub async fn created_at(&self) -> Result<DateTime<Utc>> {
        Ok(self
            .entity
            .require(AccountField::CreatedAt, |f| &f.created_at)
            .await?)
    }

    // Addresses

    pub async fn addresses(&self, page: Page) -> Result<Vec<Address>> {
        let entities = self.stores.addresses().list(self.id(), page).await?;
        Ok(entities
            .into_iter()
            .map(|entity| Address::from_entity(entity, self.stores.clone()))
            .collect())
    }

    pub async fn address_count(&self) -> Result<u64> {
        Ok(self.stores.addresses().count(self.id()).await?)
    }

    #[instrument(skip(self, details), fields(account = %self.id()))]
    pub async fn new_address(&self, details: AddressDetails) -> Result<Address> {
        let mut form = details.into_form();
        form.account = Slot::link(self.id());
        let entity = self.stores.addresses().insert(form).await?;
        Ok(Address::from_entity(entity, self.stores.clone()))
    }

    // Payment methods

    pub async fn payment_methods(&self, page: Page) -> Result<Vec<PaymentMethod>> {
        let entities = self.stores.payment_methods().list(self.id(), page).await?;
        Ok(entities
            .into_iter()
            .map(|entity| PaymentMethod::from_entity(entity, self.stores.clone()))
            .collect())
    }

    pub async fn payment_method_count(&self) -> Result<u64> {
        Ok(self.stores.payment_methods().count(self.id()).await?)
    }

    #[instrument(skip(self, provider, label), fields(account = %self.id()))]
    pub async fn new_payment_method(
        &self,
        provider: impl Into<String>,
        label: impl Into<String>,
    ) -> Result<PaymentMethod> {
        let form = PaymentMethodForm {
            account: Slot::link(self.id()),
            provider: Slot::Value(provider.into()),
            label: Slot::Value(label.into()),
            ..Default::default()
        };
        let entity = self.stores.payment_methods().insert(form).await?;
        Ok(PaymentMethod::from_entity(entity, self.stores.clone()))
    }

    // Carts

    pub async fn carts(&self, page: Page) -> Result<Vec<Cart>> {
        let entities = self.stores.carts().list(self.id(), page).await?;
        Ok(entities
            .into_iter()
            .map(|entity| Cart::from_entity(entity, self.stores.clone()))
            .collect())
    }

    pub async fn cart_count(&self) -> Result<u64> {
        Ok(self.stores.carts().count(self.id()).await?)
    }

    #[instrument(skip(self), fields(account = %self.id()))]
    pub async fn new_cart(&self) -> Result<Cart> {
        let form = CartForm {
            account: Slot::link(self.id()),
            created_at: Slot::Value(Utc::now()),
            ..Default::default()
        };
        let entity = self.stores.carts().insert(form).await?;
        Ok(Cart::from_entity(entity, self.stores.clone()))
    }

    // Orders

    /// Orders of this account, sorted by order date.
    pub async fn orders(&self, page: Page) -> Result<Vec<Order>> {
        let entities = self.stores.orders().list(self.id(), page).await?;
        Ok(entities
            .into_iter()
            .map(|entity| Order::from_entity(entity, self.stores.clone()))
            .collect())
    }

    pub async fn order_count(&self) -> Result<u64> {
        Ok(self.stores.orders().count(self.id()).await?)
    }
}

/// Creates, finds and lists accounts.
#[derive(Debug, Clone)]
pub struct AccountManager {
    stores: Stores,
}

impl AccountManager {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub(crate) async fn init(&self) -> Result<()> {
        self.stores.accounts().init().await?;
        self.stores.addresses().init().await?;
        self.stores.payment_methods().init().await?;
        Ok(())
    }

    /// Register an account. A taken email is `Duplicate`.
    #[instrument(skip(self, email, display_name))]
    pub async fn create(
        &self,
        email: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Result<Account> {
        let email = email.into();
        if !email.contains('@') {
            return Err(shopkeep_entity::StoreError::Validation(format!(
                "not an email address: {:?}",
                email
            ))
            .into());
        }
        let form = AccountForm {
            email: Slot::Value(email),
            display_name: Slot::Value(display_name.into()),
            created_at: Slot::Value(Utc::now()),
            ..Default::default()
        };
        let entity = self.stores.accounts().insert(form).await?;
        info!(account = %entity.id(), "account created");
        Ok(Account::from_entity(entity, self.stores.clone()))
    }

    /// A wrapper for `id`. Performs no I/O; a missing account surfaces on first read.
    pub fn find(&self, id: AccountId) -> Account {
        Account::lazy(id, &self.stores)
    }

    pub async fn list(&self, page: Page) -> Result<Vec<Account>> {
        let entities = self.stores.accounts().list((), page).await?;
        Ok(entities
            .into_iter()
            .map(|entity| Account::from_entity(entity, self.stores.clone()))
            .collect())
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(self.stores.accounts().count(()).await?)
    }

    /// Remove every account together with its addresses and payment methods.
    #[instrument(skip(self))]
    pub async fn remove_all(&self) -> Result<()> {
        self.stores.payment_methods().remove_all().await?;
        self.stores.addresses().remove_all().await?;
        self.stores.accounts().remove_all().await?;
        Ok(())
    }
}
