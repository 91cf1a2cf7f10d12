//! Stored payment methods.

use shopkeep_entity::{define_form, Slot};

use crate::account::{Account, AccountForm};
use crate::error::Result;
use crate::ids::{AccountId, PaymentMethodId};

define_form! {
    /// Stored attributes of a payment method.
    pub struct PaymentMethodForm: "payment method" {
        id: PaymentMethodId,
        parent: AccountId,
        field: PaymentMethodField,
        /// Processor name, e.g. "card" or "paypal".
        provider: String => Provider,
        /// What the customer sees, e.g. "Visa ending 4242".
        label: String => Label,
    }
    links {
        account: AccountForm => Account,
    }
}

define_wrapper!(
    /// A payment method owned by an account.
    PaymentMethod(PaymentMethodForm, PaymentMethodId) via payment_methods
);

impl PaymentMethod {
    pub async fn account(&self) -> Result<Account> {
        let form = self
            .entity
            .require(PaymentMethodField::Account, |f| &f.account)
            .await?;
        Ok(Account::hydrated(form, &self.stores))
    }

    pub async fn provider(&self) -> Result<String> {
        Ok(self
            .entity
            .require(PaymentMethodField::Provider, |f| &f.provider)
            .await?)
    }

    pub async fn label(&self) -> Result<String> {
        Ok(self
            .entity
            .require(PaymentMethodField::Label, |f| &f.label)
            .await?)
    }

    pub async fn set_label(&self, label: impl Into<String>) -> Result<()> {
        let patch = PaymentMethodForm {
            label: Slot::Value(label.into()),
            ..Default::default()
        };
        self.entity.set(patch).await?;
        Ok(())
    }
}
