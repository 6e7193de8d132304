//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
///
/// Amounts are held in the currency's standard unit (e.g. dollars, not
/// cents) as [`Decimal`], so arithmetic never goes through floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Line total for `quantity` units of this price.
    ///
    /// Returns `None` on overflow.
    #[must_use]
    pub fn line_total(&self, quantity: i32) -> Option<Self> {
        let amount = self.amount.checked_mul(Decimal::from(quantity))?;
        Some(Self {
            amount,
            currency_code: self.currency_code,
        })
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.amount, self.currency_code.code())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// The three-letter ISO 4217 code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            _ => Err(format!("unknown currency code: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total() {
        let price = Price::new(Decimal::new(1999, 2), CurrencyCode::USD); // 19.99
        let total = price.line_total(3).unwrap();
        assert_eq!(total.amount, Decimal::new(5997, 2)); // 59.97
        assert_eq!(total.currency_code, CurrencyCode::USD);
    }

    #[test]
    fn test_line_total_overflow() {
        let price = Price::new(Decimal::MAX, CurrencyCode::USD);
        assert!(price.line_total(2).is_none());
    }

    #[test]
    fn test_display() {
        let price = Price::new(Decimal::new(500, 2), CurrencyCode::EUR);
        assert_eq!(price.to_string(), "5.00 EUR");
    }

    #[test]
    fn test_currency_roundtrip() {
        let code: CurrencyCode = "GBP".parse().unwrap();
        assert_eq!(code, CurrencyCode::GBP);
        assert!("XXX".parse::<CurrencyCode>().is_err());
    }
}
