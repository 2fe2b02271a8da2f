//! Money formatting.
//!
//! The backend owns all pricing; amounts arrive as `NUMERIC` columns that
//! node-postgres serializes as strings (`"499.00"`) or, for computed totals,
//! as JSON numbers. `rust_decimal::Decimal` accepts both, so records keep
//! plain `Decimal` fields and only formatting lives here.

use core::fmt;
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// ISO 4217 currency codes the storefront can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// Display symbol placed before the amount.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::INR => "₹",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// The three-letter ISO code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::INR => "INR",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INR" => Ok(Self::INR),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            other => Err(format!("unsupported currency: {other}")),
        }
    }
}

/// Format an amount for display, e.g. `₹1299.00`.
///
/// Rounds half away from zero to two decimal places. Negative amounts put the
/// sign before the symbol (`-₹50.00`).
#[must_use]
pub fn format_amount(amount: Decimal, currency: CurrencyCode) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{}{:.2}", currency.symbol(), rounded.abs())
    } else {
        format!("{}{:.2}", currency.symbol(), rounded.abs())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount_pads_decimals() {
        assert_eq!(format_amount(Decimal::new(499, 0), CurrencyCode::INR), "₹499.00");
        assert_eq!(format_amount(Decimal::new(45, 1), CurrencyCode::USD), "$4.50");
    }

    #[test]
    fn test_format_amount_rounds_half_up() {
        assert_eq!(format_amount(Decimal::new(10005, 3), CurrencyCode::INR), "₹10.01");
        assert_eq!(format_amount(Decimal::new(10004, 3), CurrencyCode::INR), "₹10.00");
    }

    #[test]
    fn test_format_amount_negative() {
        assert_eq!(format_amount(Decimal::new(-50, 0), CurrencyCode::GBP), "-£50.00");
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("inr".parse::<CurrencyCode>().unwrap(), CurrencyCode::INR);
        assert_eq!(" EUR ".parse::<CurrencyCode>().unwrap(), CurrencyCode::EUR);
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }

    #[test]
    fn test_decimal_accepts_string_and_number() {
        let from_str: Decimal = serde_json::from_str("\"499.50\"").unwrap();
        let from_num: Decimal = serde_json::from_str("499.5").unwrap();
        assert_eq!(from_str, from_num);
    }
}
