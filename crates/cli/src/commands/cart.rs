//! Cart and checkout commands.

#![allow(clippy::print_stdout)]

use soapery_core::{CartLineKey, Product};
use soapery_storefront::cart::{CartStore, CartSummary};
use soapery_storefront::{Catalog, StorefrontError};
use tracing::info;

/// Print the cart.
pub fn show(store: &CartStore) {
    print_summary(&store.summary());
}

/// Add one unit of a catalog product.
///
/// # Errors
///
/// Returns `NotFound` for unknown products or sizes, or a storage error if
/// the cart could not be saved.
pub async fn add(
    store: &mut CartStore,
    catalog: &Catalog,
    id: &str,
    size: Option<String>,
) -> Result<(), StorefrontError> {
    let product = catalog
        .get_product_by_id(id)
        .await
        .ok_or_else(|| StorefrontError::NotFound(format!("product {id}")))?;

    let size = resolve_size(&product, size)?;
    info!(product = %product.id, size = ?size, "Adding to cart");

    let name = product.name.clone();
    store.add_to_cart(product, size)?;
    println!("Added {name} to the cart.");
    show(store);
    Ok(())
}

/// Remove a line.
///
/// # Errors
///
/// Returns a storage error if the cart could not be saved.
pub fn remove(store: &mut CartStore, id: &str, size: Option<String>) -> Result<(), StorefrontError> {
    store.remove_from_cart(CartLineKey::new(id, size))?;
    show(store);
    Ok(())
}

/// Set a line's quantity.
///
/// # Errors
///
/// Returns a storage error if the cart could not be saved.
pub fn update(
    store: &mut CartStore,
    id: &str,
    quantity: i64,
    size: Option<String>,
) -> Result<(), StorefrontError> {
    store.update_quantity(CartLineKey::new(id, size), quantity)?;
    show(store);
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns a storage error if the cart could not be saved.
pub fn clear(store: &mut CartStore) -> Result<(), StorefrontError> {
    store.clear_cart()?;
    println!("Cart emptied.");
    Ok(())
}

/// Place a simulated order: print the summary, then empty the cart.
///
/// # Errors
///
/// Returns `EmptyCart` when there is nothing to order, or a storage error if
/// the emptied cart could not be saved.
pub fn checkout(store: &mut CartStore) -> Result<(), StorefrontError> {
    if store.state().is_empty() {
        return Err(StorefrontError::EmptyCart);
    }

    let summary = store.summary();
    println!("Order summary");
    println!("=============");
    print_summary(&summary);

    store.clear_cart()?;
    info!(items = summary.item_count, total = %summary.subtotal, "Order placed");
    println!("\nOrder placed. Thank you!");
    Ok(())
}

/// Pick the size for a new line.
///
/// Products without sizes take none; otherwise the requested size must be
/// offered, and the first size is used when none is requested.
fn resolve_size(product: &Product, requested: Option<String>) -> Result<Option<String>, StorefrontError> {
    if product.sizes.is_empty() {
        return Ok(None);
    }

    match requested {
        None => Ok(product.sizes.first().cloned()),
        Some(size) if product.sizes.contains(&size) => Ok(Some(size)),
        Some(size) => Err(StorefrontError::NotFound(format!(
            "size {size} for product {} (available: {})",
            product.id,
            product.sizes.join(", ")
        ))),
    }
}

fn print_summary(summary: &CartSummary) {
    if summary.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for line in &summary.items {
        let name = match &line.selected_size {
            Some(size) => format!("{} ({size})", line.name),
            None => line.name.clone(),
        };
        println!(
            "{:>3} x {:<40} {:>9} {:>10}",
            line.quantity, name, line.price, line.line_price
        );
    }
    println!("{} items, subtotal {}", summary.item_count, summary.subtotal);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use soapery_storefront::catalog::normalize_product;

    use super::*;

    fn soap() -> Product {
        normalize_product(&json!({"id": "1", "name": "Jabón", "price": 8, "sizes": ["100g", "150g"]}))
    }

    #[test]
    fn test_resolve_size_defaults_to_first() {
        assert_eq!(resolve_size(&soap(), None).unwrap().as_deref(), Some("100g"));
    }

    #[test]
    fn test_resolve_size_rejects_unknown() {
        assert!(matches!(
            resolve_size(&soap(), Some("1kg".to_string())),
            Err(StorefrontError::NotFound(_))
        ));
        assert_eq!(
            resolve_size(&soap(), Some("150g".to_string())).unwrap().as_deref(),
            Some("150g")
        );
    }

    #[test]
    fn test_resolve_size_for_unsized_product() {
        let balm = normalize_product(&json!({"id": "7", "price": 4}));
        assert!(resolve_size(&balm, Some("100g".to_string())).unwrap().is_none());
    }

    #[test]
    fn test_checkout_empties_cart() {
        let mut store = CartStore::detached();
        assert!(matches!(checkout(&mut store), Err(StorefrontError::EmptyCart)));

        store.add_to_cart(soap(), Some("100g".to_string())).unwrap();
        checkout(&mut store).unwrap();
        assert!(store.state().is_empty());
    }

    #[tokio::test]
    async fn test_add_resolves_through_catalog() {
        let mut store = CartStore::detached();
        add(&mut store, &Catalog::offline(), "1", None).await.unwrap();
        assert_eq!(store.state().cart_count(), 1);
        assert!(matches!(
            add(&mut store, &Catalog::offline(), "missing-id", None).await,
            Err(StorefrontError::NotFound(_))
        ));
    }
}
