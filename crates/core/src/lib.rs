//! Shopfront Core - Shared types library.
//!
//! This crate provides common types used across the Shopfront components:
//! - `client` - Cart, session, and image state managers
//! - `cli` - Command-line front end for the storefront backend
//!
//! # Architecture
//!
//! The core crate contains only types and validators - no I/O, no storage,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, prices, and the phone and email validators

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
