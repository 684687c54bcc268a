//! Domain models for cart, session, and image state.
//!
//! These are also the persisted shapes: field names match the JSON the
//! storefront has always written, so existing stored state keeps loading.

pub mod cart;
pub mod image;
pub mod user;

pub use cart::{CartItem, CartState};
pub use image::{ImageCatalog, ProductImage};
pub use user::{ProfilePatch, ProfileUpdate, User, UserSession};
