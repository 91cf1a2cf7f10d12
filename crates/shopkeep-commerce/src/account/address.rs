//! Shipping addresses.

use serde::{Deserialize, Serialize};
use shopkeep_entity::{define_form, Slot};

use crate::account::{Account, AccountForm};
use crate::error::Result;
use crate::ids::{AccountId, AddressId};

define_form! {
    /// Stored attributes of a shipping address.
    pub struct AddressForm: "address" {
        id: AddressId,
        parent: AccountId,
        field: AddressField,
        recipient: String => Recipient,
        street: String => Street,
        city: String => City,
        postal_code: String => PostalCode,
        /// ISO country code.
        country: String => Country,
        /// Nullable.
        phone: String => Phone,
    }
    links {
        account: AccountForm => Account,
    }
}

/// Every user-editable attribute of an address at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressDetails {
    pub recipient: String,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub phone: Option<String>,
}

impl AddressDetails {
    pub fn new(
        recipient: impl Into<String>,
        street: impl Into<String>,
        city: impl Into<String>,
        postal_code: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            street: street.into(),
            city: city.into(),
            postal_code: postal_code.into(),
            country: country.into(),
            phone: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// A form carrying every detail, with the phone known even when absent.
    pub fn into_form(self) -> AddressForm {
        AddressForm {
            recipient: Slot::Value(self.recipient),
            street: Slot::Value(self.street),
            city: Slot::Value(self.city),
            postal_code: Slot::Value(self.postal_code),
            country: Slot::Value(self.country),
            phone: Slot::from_option(self.phone),
            ..Default::default()
        }
    }
}

define_wrapper!(
    /// A shipping address owned by an account.
    Address(AddressForm, AddressId) via addresses
);

impl Address {
    /// The owning account, pre-filled with whatever the store joined.
    pub async fn account(&self) -> Result<Account> {
        let form = self
            .entity
            .require(AddressField::Account, |f| &f.account)
            .await?;
        Ok(Account::hydrated(form, &self.stores))
    }

    pub async fn recipient(&self) -> Result<String> {
        Ok(self
            .entity
            .require(AddressField::Recipient, |f| &f.recipient)
            .await?)
    }

    pub async fn street(&self) -> Result<String> {
        Ok(self.entity.require(AddressField::Street, |f| &f.street).await?)
    }

    pub async fn city(&self) -> Result<String> {
        Ok(self.entity.require(AddressField::City, |f| &f.city).await?)
    }

    pub async fn postal_code(&self) -> Result<String> {
        Ok(self
            .entity
            .require(AddressField::PostalCode, |f| &f.postal_code)
            .await?)
    }

    pub async fn country(&self) -> Result<String> {
        Ok(self.entity.require(AddressField::Country, |f| &f.country).await?)
    }

    pub async fn phone(&self) -> Result<Option<String>> {
        Ok(self.entity.get(AddressField::Phone, |f| &f.phone).await?)
    }

    pub async fn set_phone(&self, phone: impl Into<String>) -> Result<()> {
        let patch = AddressForm {
            phone: Slot::Value(phone.into()),
            ..Default::default()
        };
        self.entity.set(patch).await?;
        Ok(())
    }

    pub async fn clear_phone(&self) -> Result<()> {
        let patch = AddressForm {
            phone: Slot::Null,
            ..Default::default()
        };
        self.entity.set(patch).await?;
        Ok(())
    }

    /// Replace every detail in one write.
    pub async fn update(&self, details: AddressDetails) -> Result<()> {
        self.entity.set(details.into_form()).await?;
        Ok(())
    }
}
