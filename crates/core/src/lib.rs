//! Soapery Core - canonical data model.
//!
//! This crate provides the types shared by every Soapery component:
//! - `storefront` - catalog access layer and cart store
//! - `cli` - command-line host driving the storefront library
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no storage
//! access, no HTTP clients. Anything emitted by the catalog or held by the
//! cart is expressed in these types.
//!
//! # Modules
//!
//! - [`types`] - IDs, products, categories and cart state

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
