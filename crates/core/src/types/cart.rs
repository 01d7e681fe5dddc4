//! Cart line and cart state types.
//!
//! `CartState` keeps its totals private and recomputes them whenever it is
//! built, so `cart_total` and `cart_count` can never drift from the items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::product::Product;

/// Identity of a cart line: product ID plus selected size.
///
/// Two lines for the same product with different sizes are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CartLineKey {
    pub id: ProductId,
    pub selected_size: Option<String>,
}

impl CartLineKey {
    #[must_use]
    pub fn new(id: impl Into<ProductId>, selected_size: Option<String>) -> Self {
        Self {
            id: id.into(),
            selected_size,
        }
    }
}

impl From<ProductId> for CartLineKey {
    fn from(id: ProductId) -> Self {
        Self::new(id, None)
    }
}

/// A product in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    /// Always at least 1.
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_size: Option<String>,
}

impl CartItem {
    /// A new line holding a single unit.
    #[must_use]
    pub const fn new(product: Product, selected_size: Option<String>) -> Self {
        Self {
            product,
            quantity: 1,
            selected_size,
        }
    }

    /// The line's identity.
    #[must_use]
    pub fn key(&self) -> CartLineKey {
        CartLineKey::new(self.product.id.clone(), self.selected_size.clone())
    }

    /// Whether this line has the given identity.
    #[must_use]
    pub fn matches(&self, key: &CartLineKey) -> bool {
        self.product.id == key.id && self.selected_size == key.selected_size
    }

    /// `price * quantity`, saturating at `Decimal::MAX`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product
            .price
            .checked_mul(Decimal::from(self.quantity))
            .unwrap_or(Decimal::MAX)
    }
}

/// Cart contents plus derived totals and the drawer flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    cart_items: Vec<CartItem>,
    cart_total: Decimal,
    cart_count: u64,
    is_cart_open: bool,
}

impl CartState {
    /// Build a state from its items, computing the totals.
    #[must_use]
    pub fn new(cart_items: Vec<CartItem>, is_cart_open: bool) -> Self {
        let mut state = Self {
            cart_items,
            cart_total: Decimal::ZERO,
            cart_count: 0,
            is_cart_open,
        };
        state.recompute_totals();
        state
    }

    /// An empty, closed cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new(), false)
    }

    fn recompute_totals(&mut self) {
        self.cart_count = self
            .cart_items
            .iter()
            .map(|item| u64::from(item.quantity))
            .sum();
        self.cart_total = self
            .cart_items
            .iter()
            .map(CartItem::line_total)
            .fold(Decimal::ZERO, |total, line| {
                total.checked_add(line).unwrap_or(Decimal::MAX)
            });
    }

    #[must_use]
    pub fn cart_items(&self) -> &[CartItem] {
        &self.cart_items
    }

    /// `Σ price × quantity`.
    #[must_use]
    pub const fn cart_total(&self) -> Decimal {
        self.cart_total
    }

    /// `Σ quantity`.
    #[must_use]
    pub const fn cart_count(&self) -> u64 {
        self.cart_count
    }

    #[must_use]
    pub const fn is_cart_open(&self) -> bool {
        self.is_cart_open
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart_items.is_empty()
    }

    /// Find the line with the given identity.
    #[must_use]
    pub fn line(&self, key: &CartLineKey) -> Option<&CartItem> {
        self.cart_items.iter().find(|item| item.matches(key))
    }

    /// Split into items and the open flag, for building the next state.
    #[must_use]
    pub fn into_parts(self) -> (Vec<CartItem>, bool) {
        (self.cart_items, self.is_cart_open)
    }
}

impl Default for CartState {
    fn default() -> Self {
        Self::empty()
    }
}
