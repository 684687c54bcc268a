//! Shopfront client library.
//!
//! Client-side state for the Shopfront storefront backend:
//!
//! - [`cart`] - shopping cart with a 12-hour expiration window
//! - [`session`] - authenticated user record and account operations
//! - [`images`] - product image catalog
//! - [`storage`] - durable key-value store the managers mirror their state into
//! - [`api`] - the backend's JSON API
//!
//! Every manager commits a mutation by updating memory first and then
//! writing the new state to the [`storage::PersistentStore`]. A crash between
//! the two leaves the stored copy one mutation behind, never ahead.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod images;
pub mod models;
pub mod session;
pub mod storage;
pub mod time;

pub use cart::{CART_EXPIRATION_HOURS, CartError, CartManager, RestoreOutcome};
pub use error::{ClientError, ErrorKind};
pub use images::{ImageError, ImageStore};
pub use session::{SessionError, SessionManager, resume_backend_session};
