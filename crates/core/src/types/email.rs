//! Email address validation.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// `name@provider.tld`: the top-level domain is 2-4 ASCII word characters,
/// every other label ASCII word characters and hyphens.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_.-]+@([A-Za-z0-9_-]+\.)+[A-Za-z0-9_-]{2,4}$").expect("Invalid regex")
});

/// Returns `true` if `email_address` has the `local@domain.tld` shape.
///
/// This is a shape check for form input, not RFC 5322 parsing: `+` tags
/// and long top-level domains are refused.
///
/// ```
/// use shopfront_core::valid_email_address;
///
/// assert!(valid_email_address("a@b.com"));
/// assert!(!valid_email_address("a@b"));
/// ```
#[must_use]
pub fn valid_email_address(email_address: &str) -> bool {
    EMAIL_RE.is_match(email_address)
}

/// Longest address accepted (RFC 5321 path limit).
const MAX_EMAIL_LEN: usize = 254;

/// Reasons an address is refused by [`Email::parse`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email address is empty")]
    Empty,
    #[error("email address is longer than 254 characters")]
    TooLong,
    #[error("email address must look like name@provider.tld")]
    Malformed,
}

/// An address that passed [`valid_email_address`], with surrounding
/// whitespace removed.
///
/// ```
/// use shopfront_core::Email;
///
/// let email = Email::parse(" ada@example.com ").unwrap();
/// assert_eq!(email.as_str(), "ada@example.com");
/// assert!(Email::parse("ada@localhost").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Trim and validate an address.
    ///
    /// # Errors
    ///
    /// Returns `EmailError` if the trimmed input is empty, too long, or not
    /// an accepted shape.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();
        match s.len() {
            0 => Err(EmailError::Empty),
            len if len > MAX_EMAIL_LEN => Err(EmailError::TooLong),
            _ if !valid_email_address(s) => Err(EmailError::Malformed),
            _ => Ok(Self(s.to_owned())),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
