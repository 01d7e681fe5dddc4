//! Display data for checkout summaries.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use soapery_core::{CartItem, CartState};

/// One cart line ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLineSummary {
    pub id: String,
    pub name: String,
    pub selected_size: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

/// A cart ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub items: Vec<CartLineSummary>,
    pub subtotal: String,
    pub item_count: u64,
}

impl CartSummary {
    /// Create an empty cart summary.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: format_price(Decimal::ZERO),
            item_count: 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Format an amount as a price string, e.g. `$12.50`.
#[must_use]
pub fn format_price(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("${rounded:.2}")
}

impl From<&CartState> for CartSummary {
    fn from(state: &CartState) -> Self {
        Self {
            items: state.cart_items().iter().map(CartLineSummary::from).collect(),
            subtotal: format_price(state.cart_total()),
            item_count: state.cart_count(),
        }
    }
}

impl From<&CartItem> for CartLineSummary {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.product.id.to_string(),
            name: item.product.name.clone(),
            selected_size: item.selected_size.clone(),
            quantity: item.quantity,
            price: format_price(item.product.price),
            line_price: format_price(item.line_total()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use soapery_core::Product;

    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(Decimal::new(1250, 2)), "$12.50");
        assert_eq!(format_price(Decimal::from(8)), "$8.00");
        assert_eq!(format_price(Decimal::new(9995, 3)), "$10.00");
        assert_eq!(format_price(Decimal::ZERO), "$0.00");
    }

    #[test]
    fn test_empty_summary() {
        let summary = CartSummary::empty();
        assert!(summary.is_empty());
        assert_eq!(summary.subtotal, "$0.00");
        assert_eq!(summary, CartSummary::from(&CartState::empty()));
    }

    #[test]
    fn test_summary_from_state() {
        let mut line = CartItem::new(
            Product::new("1", "Jabón de Lavanda", Decimal::new(850, 2)),
            Some("100g".to_string()),
        );
        line.quantity = 3;
        let state = CartState::new(vec![line], true);

        let summary = CartSummary::from(&state);
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.subtotal, "$25.50");
        assert_eq!(summary.items[0].price, "$8.50");
        assert_eq!(summary.items[0].line_price, "$25.50");
        assert_eq!(summary.items[0].selected_size.as_deref(), Some("100g"));
    }
}
