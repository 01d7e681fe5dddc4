//! Soapery storefront library.
//!
//! The catalog access layer (remote content API with a bundled fallback) and
//! the cart store (reducer state persisted through a storage port), plus the
//! configuration and error handling they share.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod cms;
pub mod config;
pub mod error;

pub use cart::{CartAction, CartStore};
pub use catalog::{Catalog, DataOrigin, FallbackReason, Sourced};
pub use config::StorefrontConfig;
pub use error::{Result, StorefrontError};
