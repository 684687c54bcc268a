//! Phone number validation and formatting.
//!
//! Accepted input shapes:
//!
//! - `(123) 456-7890`
//! - `(123)456-7890`
//! - `123-456-7890`
//! - `123.456.7890`
//! - `1234567890`
//! - `+11234567890`
//!
//! The final group may carry 4-6 digits so that short extensions are accepted.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static PHONE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?\(?[0-9]{3}\)?[-\s.]?[0-9]{3}[-\s.]?[0-9]{4,6}$").expect("Invalid regex")
});

/// Number of digits in a national number (area code + exchange + line).
const NATIONAL_DIGITS: usize = 10;

/// Returns `true` if `phone_number` matches one of the accepted shapes.
///
/// ```
/// use shopfront_core::valid_phone_number;
///
/// assert!(valid_phone_number("(123) 456-7890"));
/// assert!(!valid_phone_number("12-34"));
/// ```
#[must_use]
pub fn valid_phone_number(phone_number: &str) -> bool {
    PHONE_NUMBER_RE.is_match(phone_number)
}

/// Normalize a phone number to dash-separated groups.
///
/// Every non-digit character is stripped first. Ten digits format as
/// `123-456-7890`. Anything past ten digits is treated as the country code,
/// so `+11234567890` becomes `+1-123-456-7890` and `441234567890` becomes
/// `+44-123-456-7890`. Fewer than ten digits are returned bare.
///
/// ```
/// use shopfront_core::format_phone_number;
///
/// assert_eq!(format_phone_number("123.456.7890"), "123-456-7890");
/// assert_eq!(format_phone_number("+11234567890"), "+1-123-456-7890");
/// ```
#[must_use]
pub fn format_phone_number(phone_number: &str) -> String {
    let digits: String = phone_number.chars().filter(char::is_ascii_digit).collect();

    if digits.len() < NATIONAL_DIGITS {
        return digits;
    }

    // All characters are ASCII digits, so byte offsets are char boundaries.
    let (country, national) = digits.split_at(digits.len() - NATIONAL_DIGITS);
    let (area, rest) = national.split_at(3);
    let (exchange, line) = rest.split_at(3);

    if country.is_empty() {
        format!("{area}-{exchange}-{line}")
    } else {
        format!("+{country}-{area}-{exchange}-{line}")
    }
}

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneNumberError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input does not match any accepted shape.
    #[error("invalid phone number format: {0}")]
    InvalidFormat(String),
}

/// A validated phone number, stored in its normalized form.
///
/// ```
/// use shopfront_core::PhoneNumber;
///
/// let phone = PhoneNumber::parse("(123) 456-7890").unwrap();
/// assert_eq!(phone.as_str(), "123-456-7890");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Validate and normalize a phone number.
    ///
    /// # Errors
    ///
    /// Returns `PhoneNumberError::Empty` for empty input and
    /// `PhoneNumberError::InvalidFormat` if the input is not an accepted shape.
    pub fn parse(s: &str) -> Result<Self, PhoneNumberError> {
        if s.is_empty() {
            return Err(PhoneNumberError::Empty);
        }

        if !valid_phone_number(s) {
            return Err(PhoneNumberError::InvalidFormat(s.to_owned()));
        }

        Ok(Self(format_phone_number(s)))
    }

    /// Returns the normalized phone number.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `PhoneNumber` and returns the normalized string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = PhoneNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_phone_numbers() {
        assert!(valid_phone_number("(123) 456-7890"));
        assert!(valid_phone_number("(123)456-7890"));
        assert!(valid_phone_number("123-456-7890"));
        assert!(valid_phone_number("123.456.7890"));
        assert!(valid_phone_number("123 456 7890"));
        assert!(valid_phone_number("1234567890"));
        assert!(valid_phone_number("+11234567890"));
        assert!(valid_phone_number("123-456-789012"));
    }

    #[test]
    fn test_invalid_phone_numbers() {
        assert!(!valid_phone_number("12-34"));
        assert!(!valid_phone_number(""));
        assert!(!valid_phone_number("123-456-789"));
        assert!(!valid_phone_number("123-456-7890123"));
        assert!(!valid_phone_number("abc-def-ghij"));
        assert!(!valid_phone_number("123_456_7890"));
    }

    #[test]
    fn test_format_ten_digits() {
        assert_eq!(format_phone_number("123.456.7890"), "123-456-7890");
        assert_eq!(format_phone_number("(123) 456-7890"), "123-456-7890");
        assert_eq!(format_phone_number("1234567890"), "123-456-7890");
    }

    #[test]
    fn test_format_single_digit_country_code() {
        assert_eq!(format_phone_number("+11234567890"), "+1-123-456-7890");
    }

    #[test]
    fn test_format_multi_digit_country_code() {
        assert_eq!(format_phone_number("+441234567890"), "+44-123-456-7890");
        assert_eq!(format_phone_number("3531234567890"), "+353-123-456-7890");
    }

    #[test]
    fn test_format_short_input_is_left_bare() {
        assert_eq!(format_phone_number("12-34"), "1234");
        assert_eq!(format_phone_number(""), "");
    }

    #[test]
    fn test_parse_normalizes() {
        let phone = PhoneNumber::parse("+1 (123) 456-7890");
        // A space after the leading country code is not an accepted shape.
        assert!(phone.is_err());

        let phone = PhoneNumber::parse("+11234567890").unwrap();
        assert_eq!(phone.as_str(), "+1-123-456-7890");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(PhoneNumber::parse(""), Err(PhoneNumberError::Empty));
        assert_eq!(
            PhoneNumber::parse("12-34"),
            Err(PhoneNumberError::InvalidFormat("12-34".to_string()))
        );
    }

    #[test]
    fn test_serde_transparent() {
        let phone = PhoneNumber::parse("123.456.7890").unwrap();
        assert_eq!(serde_json::to_string(&phone).unwrap(), "\"123-456-7890\"");
    }
}
