//! Money type with decimal precision and currency.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! This type wraps `rust_decimal::Decimal` for arbitrary precision and
//! refuses any arithmetic across two different currencies.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by money arithmetic and currency parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// Binary operation attempted on two different currencies.
    #[error("Currency mismatch: {left} vs {right}")]
    CurrencyMismatch {
        /// Currency of the left operand.
        left: Currency,
        /// Currency of the right operand.
        right: Currency,
    },

    /// Currency code is not a 3-letter ISO 4217 code.
    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),

    /// Decimal overflow during arithmetic.
    #[error("Arithmetic overflow")]
    Overflow,
}

/// ISO 4217 currency code (three uppercase ASCII letters).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency([u8; 3]);

impl Currency {
    /// US Dollar
    pub const USD: Self = Self(*b"USD");
    /// Euro
    pub const EUR: Self = Self(*b"EUR");
    /// Indonesian Rupiah
    pub const IDR: Self = Self(*b"IDR");
    /// Singapore Dollar
    pub const SGD: Self = Self(*b"SGD");
    /// Japanese Yen
    pub const JPY: Self = Self(*b"JPY");

    /// Parses a currency code, accepting lowercase input.
    pub fn new(code: &str) -> Result<Self, MoneyError> {
        let bytes = code.trim().as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(MoneyError::InvalidCurrency(code.to_string()));
        }
        Ok(Self([
            bytes[0].to_ascii_uppercase(),
            bytes[1].to_ascii_uppercase(),
            bytes[2].to_ascii_uppercase(),
        ]))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Only ASCII letters are ever stored.
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Currency({})", self.as_str())
    }
}

impl FromStr for Currency {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.as_str().to_string()
    }
}

/// Represents a monetary amount with currency.
///
/// Uses `Decimal` internally to avoid floating-point precision errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// The amount in major units (e.g., 100.25 dollars).
    pub amount: Decimal,
    /// ISO 4217 currency code (e.g., "USD", "IDR").
    pub currency: Currency,
}

impl Money {
    /// Creates a new Money instance.
    #[must_use]
    pub const fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Creates a zero amount in the specified currency.
    #[must_use]
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is strictly greater than zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    /// Returns the same amount with the sign flipped.
    #[must_use]
    pub fn negate(&self) -> Self {
        Self::new(-self.amount, self.currency)
    }

    /// Returns the absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self::new(self.amount.abs(), self.currency)
    }

    /// Adds two amounts of the same currency.
    pub fn checked_add(&self, other: &Self) -> Result<Self, MoneyError> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or(MoneyError::Overflow)?;
        Ok(Self::new(amount, self.currency))
    }

    /// Subtracts `other` from `self`; both must share a currency.
    pub fn checked_sub(&self, other: &Self) -> Result<Self, MoneyError> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_sub(other.amount)
            .ok_or(MoneyError::Overflow)?;
        Ok(Self::new(amount, self.currency))
    }

    /// Sums an iterator of amounts, starting from zero in `currency`.
    pub fn try_sum<'a, I>(currency: Currency, items: I) -> Result<Self, MoneyError>
    where
        I: IntoIterator<Item = &'a Self>,
    {
        items
            .into_iter()
            .try_fold(Self::zero(currency), |acc, item| acc.checked_add(item))
    }

    /// Returns an error unless both amounts use the same currency.
    pub fn ensure_same_currency(&self, other: &Self) -> Result<(), MoneyError> {
        if self.currency == other.currency {
            Ok(())
        } else {
            Err(MoneyError::CurrencyMismatch {
                left: self.currency,
                right: other.currency,
            })
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_new() {
        let amount = dec!(100.00);
        let money = Money::new(amount, Currency::USD);
        assert_eq!(money.amount, amount);
        assert_eq!(money.currency, Currency::USD);
    }

    #[test]
    fn test_money_zero_is_currency_specific() {
        let money = Money::zero(Currency::IDR);
        assert!(money.is_zero());
        assert_eq!(money.currency, Currency::IDR);
        assert_ne!(money, Money::zero(Currency::USD));
    }

    #[test]
    fn test_money_sign_checks() {
        assert!(Money::new(dec!(10), Currency::USD).is_positive());
        assert!(Money::new(dec!(-10), Currency::USD).is_negative());
        let zero = Money::new(dec!(0), Currency::USD);
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());
    }

    #[test]
    fn test_same_currency_arithmetic() {
        let a = Money::new(dec!(100.50), Currency::EUR);
        let b = Money::new(dec!(0.50), Currency::EUR);
        assert_eq!(a.checked_add(&b).unwrap().amount, dec!(101.00));
        assert_eq!(a.checked_sub(&b).unwrap().amount, dec!(100.00));
        assert_eq!(b.negate().amount, dec!(-0.50));
        assert_eq!(b.negate().abs(), b);
    }

    #[test]
    fn test_cross_currency_arithmetic_is_rejected() {
        let usd = Money::new(dec!(1), Currency::USD);
        let eur = Money::new(dec!(1), Currency::EUR);
        assert_eq!(
            usd.checked_add(&eur),
            Err(MoneyError::CurrencyMismatch {
                left: Currency::USD,
                right: Currency::EUR,
            })
        );
        assert!(usd.checked_sub(&eur).is_err());
    }

    #[test]
    fn test_try_sum() {
        let items = [
            Money::new(dec!(1.10), Currency::SGD),
            Money::new(dec!(2.20), Currency::SGD),
        ];
        let total = Money::try_sum(Currency::SGD, &items).unwrap();
        assert_eq!(total.amount, dec!(3.30));

        let mixed = [Money::new(dec!(1), Currency::JPY)];
        assert!(Money::try_sum(Currency::SGD, &mixed).is_err());
    }

    #[rstest]
    #[case("USD", Currency::USD)]
    #[case("usd", Currency::USD)]
    #[case(" eur ", Currency::EUR)]
    #[case("JPY", Currency::JPY)]
    fn test_currency_from_str(#[case] input: &str, #[case] expected: Currency) {
        assert_eq!(input.parse::<Currency>().unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("US")]
    #[case("USDX")]
    #[case("U5D")]
    fn test_currency_from_str_rejects(#[case] input: &str) {
        assert!(matches!(
            input.parse::<Currency>(),
            Err(MoneyError::InvalidCurrency(_))
        ));
    }

    #[test]
    fn test_currency_serde_as_string() {
        let json = serde_json::to_string(&Currency::IDR).unwrap();
        assert_eq!(json, "\"IDR\"");
        let parsed: Currency = serde_json::from_str("\"sgd\"").unwrap();
        assert_eq!(parsed, Currency::SGD);
        assert!(serde_json::from_str::<Currency>("\"DOLLARS\"").is_err());
    }

    #[test]
    fn test_money_display() {
        let money = Money::new(dec!(12.34), Currency::USD);
        assert_eq!(money.to_string(), "12.34 USD");
    }
}
