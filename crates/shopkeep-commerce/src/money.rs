//! Money type for representing monetary values.
//!
//! Amounts are integers in the currency's minor unit (cents for USD). Stored
//! amounts never go through floating point, and all arithmetic is checked.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    JPY,
    CAD,
    AUD,
    CHF,
    CNY,
    INR,
    MXN,
}

impl Currency {
    /// Get the currency code (e.g., "USD").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
            Currency::CHF => "CHF",
            Currency::CNY => "CNY",
            Currency::INR => "INR",
            Currency::MXN => "MXN",
        }
    }

    /// Get the currency symbol (e.g., "$").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
            Currency::GBP => "\u{00a3}",
            Currency::JPY => "\u{00a5}",
            Currency::CAD => "CA$",
            Currency::AUD => "A$",
            Currency::CHF => "CHF",
            Currency::CNY => "\u{00a5}",
            Currency::INR => "\u{20b9}",
            Currency::MXN => "MX$",
        }
    }

    /// Number of minor-unit digits.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            "JPY" => Some(Currency::JPY),
            "CAD" => Some(Currency::CAD),
            "AUD" => Some(Currency::AUD),
            "CHF" => Some(Currency::CHF),
            "CNY" => Some(Currency::CNY),
            "INR" => Some(Currency::INR),
            "MXN" => Some(Currency::MXN),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in the smallest currency unit.
    pub amount_minor: i64,
    pub currency: Currency,
}

impl Money {
    pub fn new(amount_minor: i64, currency: Currency) -> Self {
        Self {
            amount_minor,
            currency,
        }
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    pub fn is_zero(&self) -> bool {
        self.amount_minor == 0
    }

    pub fn is_negative(&self) -> bool {
        self.amount_minor < 0
    }

    /// Add another amount. `None` on currency mismatch or overflow.
    pub fn checked_add(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        let amount = self.amount_minor.checked_add(other.amount_minor)?;
        Some(Money::new(amount, self.currency))
    }

    /// Subtract another amount. `None` on currency mismatch or overflow.
    pub fn checked_sub(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        let amount = self.amount_minor.checked_sub(other.amount_minor)?;
        Some(Money::new(amount, self.currency))
    }

    /// Multiply by a quantity. `None` on overflow.
    pub fn checked_mul(&self, factor: i64) -> Option<Money> {
        let amount = self.amount_minor.checked_mul(factor)?;
        Some(Money::new(amount, self.currency))
    }

    /// Sum amounts in one currency. `None` on mismatch or overflow.
    pub fn checked_sum<'a>(
        iter: impl IntoIterator<Item = &'a Money>,
        currency: Currency,
    ) -> Option<Money> {
        iter.into_iter()
            .try_fold(Money::zero(currency), |acc, m| acc.checked_add(m))
    }

    /// Format the amount without symbol (e.g., "49.99").
    pub fn display_amount(&self) -> String {
        let places = self.currency.decimal_places();
        let sign = if self.amount_minor < 0 { "-" } else { "" };
        let magnitude = self.amount_minor.unsigned_abs();
        if places == 0 {
            return format!("{}{}", sign, magnitude);
        }
        let divisor = 10_u64.pow(places);
        format!(
            "{}{}.{:0width$}",
            sign,
            magnitude / divisor,
            magnitude % divisor,
            width = places as usize
        )
    }

    /// Format with the currency symbol (e.g., "$49.99").
    pub fn display(&self) -> String {
        format!("{}{}", self.currency.symbol(), self.display_amount())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_display() {
        assert_eq!(Money::new(4999, Currency::USD).display(), "$49.99");
        assert_eq!(Money::new(5, Currency::EUR).display_amount(), "0.05");
        assert_eq!(Money::new(-1250, Currency::USD).display_amount(), "-12.50");
        assert_eq!(Money::new(100, Currency::JPY).display(), "\u{00a5}100");
    }

    #[test]
    fn test_checked_add() {
        let a = Money::new(1000, Currency::USD);
        let b = Money::new(500, Currency::USD);
        assert_eq!(a.checked_add(&b), Some(Money::new(1500, Currency::USD)));
    }

    #[test]
    fn test_currency_mismatch_is_none() {
        let usd = Money::new(1000, Currency::USD);
        let eur = Money::new(1000, Currency::EUR);
        assert_eq!(usd.checked_add(&eur), None);
        assert_eq!(usd.checked_sub(&eur), None);
    }

    #[test]
    fn test_overflow_is_none() {
        let big = Money::new(i64::MAX, Currency::USD);
        assert_eq!(big.checked_add(&Money::new(1, Currency::USD)), None);
        assert_eq!(big.checked_mul(2), None);
    }

    #[test]
    fn test_checked_sum() {
        let prices = [
            Money::new(1000, Currency::USD).checked_mul(2).unwrap(),
            Money::new(500, Currency::USD),
            Money::new(700, Currency::USD),
        ];
        assert_eq!(
            Money::checked_sum(&prices, Currency::USD),
            Some(Money::new(3200, Currency::USD))
        );
        assert_eq!(Money::checked_sum(&prices, Currency::EUR), None);
    }

    #[test]
    fn test_currency_from_code() {
        assert_eq!(Currency::from_code("USD"), Some(Currency::USD));
        assert_eq!(Currency::from_code("eur"), Some(Currency::EUR));
        assert_eq!(Currency::from_code("INVALID"), None);
    }
}
