//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod phone;
pub mod price;

pub use email::{Email, EmailError, valid_email_address};
pub use id::ProductId;
pub use phone::{PhoneNumber, PhoneNumberError, format_phone_number, valid_phone_number};
pub use price::{Price, PriceError};
