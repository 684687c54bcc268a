//! Type-safe price representation using decimal arithmetic.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is not a decimal number.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    /// The amount is below zero.
    #[error("amount cannot be negative")]
    Negative,
}

/// A non-negative amount in dollars (not cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Price {
    pub amount: Decimal,
}

impl Price {
    /// Parse a non-negative amount such as `"19.99"`.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::InvalidAmount` if the input is not a decimal
    /// number and `PriceError::Negative` if it is below zero.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount =
            Decimal::from_str(s.trim()).map_err(|_| PriceError::InvalidAmount(s.to_owned()))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self { amount })
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        let price = Price::parse(" 19.99 ").unwrap();
        assert_eq!(price.amount, Decimal::new(1999, 2));
    }

    #[test]
    fn test_parse_rejects_garbage_and_negative() {
        assert!(matches!(
            Price::parse("abc"),
            Err(PriceError::InvalidAmount(_))
        ));
        assert_eq!(Price::parse("-1.00"), Err(PriceError::Negative));
        assert!(Price::parse("-0").is_ok());
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::parse("5").unwrap().to_string(), "$5.00");
        assert_eq!(Price::parse("10.5").unwrap().to_string(), "$10.50");
    }
}
