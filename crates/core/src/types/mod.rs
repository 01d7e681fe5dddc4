//! Core types for Soapery.
//!
//! The canonical model: every product or category handed to the rest of the
//! system is fully populated, whatever shape the upstream data had.

pub mod cart;
pub mod category;
pub mod id;
pub mod product;

pub use cart::{CartItem, CartLineKey, CartState};
pub use category::{ALL_CATEGORY_ID, Category, CategoryRef};
pub use id::*;
pub use product::{DEFAULT_RATING, DEFAULT_STOCK, Product};
