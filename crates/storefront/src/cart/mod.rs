//! Cart store.
//!
//! # Architecture
//!
//! - One `CartStore` per session owns the `CartState`; there is no global cart
//! - Every change goes through [`CartStore::dispatch`], which runs the pure
//!   [`reduce`] step and then mirrors the cart lines to a [`CartStorage`]
//! - Storage is read exactly once, in [`CartStore::open`]
//!
//! # Example
//!
//! ```rust,ignore
//! use soapery_storefront::cart::{CartStore, FileStorage};
//!
//! let mut store = CartStore::open(FileStorage::new(".soapery"));
//! store.add_to_cart(product, Some("100g".to_string()))?;
//! println!("{} items", store.state().cart_count());
//! ```

mod action;
mod storage;
mod summary;

pub use action::{CartAction, reduce};
pub use storage::{
    CART_STORAGE_KEY, CartStorage, FileStorage, MemoryStorage, NullStorage, StorageError,
};
pub use summary::{CartLineSummary, CartSummary, format_price};

use std::fmt;

use soapery_core::{CartItem, CartLineKey, CartState, Product};
use tracing::{debug, warn};

use crate::error::{add_breadcrumb, report_non_fatal};

type Listener = Box<dyn Fn(&CartState) + Send + Sync>;

/// The cart state plus its durable mirror.
pub struct CartStore {
    state: CartState,
    storage: Box<dyn CartStorage>,
    listeners: Vec<Listener>,
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Open a store, restoring cart lines from `storage`.
    ///
    /// Missing or unreadable data starts an empty cart. The cart is always
    /// closed after opening.
    pub fn open(storage: impl CartStorage + 'static) -> Self {
        let cart_items = load_items(&storage);
        debug!(lines = cart_items.len(), "Cart store opened");

        Self {
            state: CartState::new(cart_items, false),
            storage: Box::new(storage),
            listeners: Vec::new(),
        }
    }

    /// A store with no durable backend.
    #[must_use]
    pub fn detached() -> Self {
        Self::open(NullStorage)
    }

    /// The current state.
    #[must_use]
    pub const fn state(&self) -> &CartState {
        &self.state
    }

    /// Formatted view of the current state.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary::from(&self.state)
    }

    /// Call `listener` with the new state after every dispatch.
    pub fn subscribe(&mut self, listener: impl Fn(&CartState) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Apply an action and persist the resulting cart lines.
    ///
    /// The new state is committed and observed by subscribers even when the
    /// durable write fails.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the cart lines could not be written. The
    /// in-memory state is unaffected.
    pub fn dispatch(&mut self, action: CartAction) -> Result<(), StorageError> {
        let name = action.name();
        match action.product_id() {
            Some(id) => add_breadcrumb("cart", name, Some(&[("product_id", id)])),
            None => add_breadcrumb("cart", name, None),
        }

        let current = std::mem::take(&mut self.state);
        self.state = reduce(current, action);

        debug!(
            action = name,
            lines = self.state.cart_items().len(),
            count = self.state.cart_count(),
            total = %self.state.cart_total(),
            "Cart updated"
        );

        let persisted = self.persist();

        for listener in &self.listeners {
            listener(&self.state);
        }

        if let Err(e) = &persisted {
            report_non_fatal(e, "cart persistence");
        }
        persisted
    }

    fn persist(&self) -> Result<(), StorageError> {
        let serialized = serde_json::to_string(self.state.cart_items())?;
        self.storage.write(CART_STORAGE_KEY, &serialized)
    }

    // =========================================================================
    // Action shorthands
    // =========================================================================

    /// Add one unit of `product` in the given size.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart could not be persisted.
    pub fn add_to_cart(
        &mut self,
        product: Product,
        selected_size: Option<String>,
    ) -> Result<(), StorageError> {
        self.dispatch(CartAction::AddToCart {
            product,
            selected_size,
        })
    }

    /// Remove the line with this identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart could not be persisted.
    pub fn remove_from_cart(&mut self, key: CartLineKey) -> Result<(), StorageError> {
        self.dispatch(CartAction::RemoveFromCart(key))
    }

    /// Set a line's quantity; below 1 removes the line.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart could not be persisted.
    pub fn update_quantity(&mut self, key: CartLineKey, quantity: i64) -> Result<(), StorageError> {
        self.dispatch(CartAction::UpdateQuantity { key, quantity })
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart could not be persisted.
    pub fn clear_cart(&mut self) -> Result<(), StorageError> {
        self.dispatch(CartAction::ClearCart)
    }

    /// Open, close or flip the cart drawer.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart could not be persisted.
    pub fn toggle_cart(&mut self, open: Option<bool>) -> Result<(), StorageError> {
        self.dispatch(CartAction::ToggleCart(open))
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::detached()
    }
}

fn load_items(storage: &dyn CartStorage) -> Vec<CartItem> {
    let raw = match storage.read(CART_STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(error = %e, "Failed to read stored cart, starting empty");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<CartItem>>(&raw) {
        Ok(items) => items.into_iter().filter(|item| item.quantity > 0).collect(),
        Err(e) => {
            warn!(error = %e, "Stored cart is not valid, starting empty");
            Vec::new()
        }
    }
}
