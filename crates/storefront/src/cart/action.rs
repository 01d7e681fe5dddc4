//! Cart actions and the pure reducer.

use soapery_core::{CartItem, CartLineKey, CartState, Product};

/// Every way the cart can change.
#[derive(Debug, Clone, PartialEq)]
pub enum CartAction {
    /// Add one unit; opens the cart.
    AddToCart {
        product: Product,
        selected_size: Option<String>,
    },
    /// Drop the line with this identity.
    RemoveFromCart(CartLineKey),
    /// Set a line's quantity; anything below 1 removes the line.
    UpdateQuantity { key: CartLineKey, quantity: i64 },
    /// Empty the cart.
    ClearCart,
    /// Set the open flag, or flip it when `None`.
    ToggleCart(Option<bool>),
}

impl CartAction {
    /// Short name used for logs and breadcrumbs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AddToCart { .. } => "add_to_cart",
            Self::RemoveFromCart(_) => "remove_from_cart",
            Self::UpdateQuantity { .. } => "update_quantity",
            Self::ClearCart => "clear_cart",
            Self::ToggleCart(_) => "toggle_cart",
        }
    }

    /// The product the action targets, if any.
    #[must_use]
    pub fn product_id(&self) -> Option<&str> {
        match self {
            Self::AddToCart { product, .. } => Some(product.id.as_str()),
            Self::RemoveFromCart(key) | Self::UpdateQuantity { key, .. } => Some(key.id.as_str()),
            Self::ClearCart | Self::ToggleCart(_) => None,
        }
    }
}

/// Compute the next state. Totals are recomputed on the way out.
#[must_use]
pub fn reduce(state: CartState, action: CartAction) -> CartState {
    let (mut items, mut is_open) = state.into_parts();

    match action {
        CartAction::AddToCart {
            product,
            selected_size,
        } => {
            let key = CartLineKey::new(product.id.clone(), selected_size.clone());
            match items.iter_mut().find(|item| item.matches(&key)) {
                Some(line) => line.quantity = line.quantity.saturating_add(1),
                None => items.push(CartItem::new(product, selected_size)),
            }
            is_open = true;
        }
        CartAction::RemoveFromCart(key) => {
            items.retain(|item| !item.matches(&key));
        }
        CartAction::UpdateQuantity { key, quantity } => {
            if quantity < 1 {
                items.retain(|item| !item.matches(&key));
            } else {
                let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
                for line in items.iter_mut().filter(|item| item.matches(&key)) {
                    line.quantity = quantity;
                }
            }
        }
        CartAction::ClearCart => items.clear(),
        CartAction::ToggleCart(explicit) => is_open = explicit.unwrap_or(!is_open),
    }

    CartState::new(items, is_open)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn product(id: &str, price: i64) -> Product {
        Product::new(id, format!("Jabón {id}"), Decimal::from(price))
    }

    fn add(state: CartState, id: &str, price: i64, size: Option<&str>) -> CartState {
        reduce(
            state,
            CartAction::AddToCart {
                product: product(id, price),
                selected_size: size.map(String::from),
            },
        )
    }

    fn assert_totals_consistent(state: &CartState) {
        let count: u64 = state.cart_items().iter().map(|i| u64::from(i.quantity)).sum();
        let total: Decimal = state
            .cart_items()
            .iter()
            .map(CartItem::line_total)
            .fold(Decimal::ZERO, |acc, line| acc.checked_add(line).unwrap_or(Decimal::MAX));
        assert_eq!(state.cart_count(), count);
        assert_eq!(state.cart_total(), total);
    }

    #[test]
    fn test_add_twice_merges_into_one_line() {
        let state = add(add(CartState::empty(), "p1", 10, None), "p1", 10, None);

        assert_eq!(state.cart_items().len(), 1);
        assert_eq!(state.cart_items()[0].quantity, 2);
        assert_eq!(state.cart_total(), Decimal::from(20));
        assert_eq!(state.cart_count(), 2);
        assert!(state.is_cart_open());
    }

    #[test]
    fn test_repeated_adds_count_calls() {
        let mut state = CartState::empty();
        for _ in 0..7 {
            state = add(state, "p1", 3, Some("100g"));
        }
        assert_eq!(state.cart_items().len(), 1);
        assert_eq!(state.cart_items()[0].quantity, 7);
        assert_totals_consistent(&state);
    }

    #[test]
    fn test_sizes_are_separate_lines() {
        let state = add(add(CartState::empty(), "p1", 10, Some("100g")), "p1", 12, Some("150g"));
        assert_eq!(state.cart_items().len(), 2);

        let state = reduce(
            state,
            CartAction::RemoveFromCart(CartLineKey::new("p1", Some("100g".to_string()))),
        );
        assert_eq!(state.cart_items().len(), 1);
        assert_eq!(state.cart_items()[0].selected_size.as_deref(), Some("150g"));
        assert_totals_consistent(&state);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let state = add(CartState::empty(), "p1", 10, None);
        let next = reduce(state.clone(), CartAction::RemoveFromCart(CartLineKey::new("p2", None)));
        assert_eq!(next, state);
    }

    #[test]
    fn test_update_quantity_sets_exact_value() {
        let state = add(CartState::empty(), "p1", 10, None);
        let state = reduce(
            state,
            CartAction::UpdateQuantity {
                key: CartLineKey::new("p1", None),
                quantity: 5,
            },
        );
        assert_eq!(state.cart_items()[0].quantity, 5);
        assert_eq!(state.cart_total(), Decimal::from(50));
        assert_eq!(state.cart_count(), 5);
    }

    #[test]
    fn test_update_quantity_below_one_removes_line() {
        for quantity in [0, -1, i64::MIN] {
            let state = add(CartState::empty(), "p1", 10, None);
            let state = reduce(
                state,
                CartAction::UpdateQuantity {
                    key: CartLineKey::new("p1", None),
                    quantity,
                },
            );
            assert!(state.is_empty());
            assert_eq!(state.cart_total(), Decimal::ZERO);
        }
    }

    #[test]
    fn test_update_quantity_clamps_huge_values() {
        let state = add(CartState::empty(), "p1", 1, None);
        let state = reduce(
            state,
            CartAction::UpdateQuantity {
                key: CartLineKey::new("p1", None),
                quantity: i64::MAX,
            },
        );
        assert_eq!(state.cart_items()[0].quantity, u32::MAX);
        assert_totals_consistent(&state);
    }

    #[test]
    fn test_huge_price_and_quantity_saturate_total() {
        let mut big = product("big", 0);
        big.price = Decimal::from_i128_with_scale(10_i128.pow(20), 0);
        let state = reduce(
            CartState::empty(),
            CartAction::AddToCart {
                product: big,
                selected_size: None,
            },
        );
        let state = reduce(
            state,
            CartAction::UpdateQuantity {
                key: CartLineKey::new("big", None),
                quantity: i64::MAX,
            },
        );
        assert_eq!(state.cart_items()[0].quantity, u32::MAX);
        assert_eq!(state.cart_total(), Decimal::MAX);
        assert_eq!(state.cart_count(), u64::from(u32::MAX));

        let state = add(state, "p1", 10, None);
        assert_eq!(state.cart_total(), Decimal::MAX);
        assert_totals_consistent(&state);
    }

    #[test]
    fn test_clear_cart() {
        let state = add(add(CartState::empty(), "p1", 10, None), "p2", 4, None);
        let state = reduce(state, CartAction::ClearCart);
        assert!(state.cart_items().is_empty());
        assert_eq!(state.cart_count(), 0);
        assert_eq!(state.cart_total(), Decimal::ZERO);
        assert!(state.is_cart_open());
    }

    #[test]
    fn test_toggle_cart() {
        let state = reduce(CartState::empty(), CartAction::ToggleCart(None));
        assert!(state.is_cart_open());
        let state = reduce(state, CartAction::ToggleCart(None));
        assert!(!state.is_cart_open());
        let state = reduce(state, CartAction::ToggleCart(Some(false)));
        assert!(!state.is_cart_open());
        let state = reduce(state, CartAction::ToggleCart(Some(true)));
        assert!(state.is_cart_open());
    }

    #[test]
    fn test_action_metadata() {
        let action = CartAction::UpdateQuantity {
            key: CartLineKey::new("p9", None),
            quantity: 2,
        };
        assert_eq!(action.name(), "update_quantity");
        assert_eq!(action.product_id(), Some("p9"));
        assert_eq!(CartAction::ClearCart.product_id(), None);
    }
}
