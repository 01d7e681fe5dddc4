//! Catalog commands.
//!
//! These never fail because the content API is down: the catalog serves its
//! bundled fallback data instead, and `status` says which one is in use.

#![allow(clippy::print_stdout)]

use soapery_core::{ALL_CATEGORY_ID, Product};
use soapery_storefront::cart::format_price;
use soapery_storefront::error::report_non_fatal;
use soapery_storefront::{Catalog, DataOrigin, FallbackReason, StorefrontError};

/// List products.
///
/// # Errors
///
/// Returns an error if JSON output cannot be serialized.
pub async fn products(
    catalog: &Catalog,
    featured: bool,
    category: Option<&str>,
    json: bool,
) -> Result<(), StorefrontError> {
    let products = select_products(catalog, featured, category).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&products)?);
        return Ok(());
    }

    if products.is_empty() {
        println!("No products found.");
        return Ok(());
    }

    for product in &products {
        println!("{}", product_row(product));
    }
    println!("\n{} products", products.len());
    Ok(())
}

/// Products matching the listing flags; `todos` applies no category filter.
async fn select_products(
    catalog: &Catalog,
    featured: bool,
    category: Option<&str>,
) -> Vec<Product> {
    let category = category.filter(|c| *c != ALL_CATEGORY_ID);

    match (featured, category) {
        (true, Some(category)) => catalog
            .get_featured_products()
            .await
            .into_iter()
            .filter(|p| p.in_category(category))
            .collect(),
        (true, None) => catalog.get_featured_products().await,
        (false, Some(category)) => catalog.get_products_by_category(category).await,
        (false, None) => catalog.get_all_products().await,
    }
}

/// Show a single product.
///
/// # Errors
///
/// Returns `NotFound` if no source has the product.
pub async fn product(catalog: &Catalog, id: &str, json: bool) -> Result<(), StorefrontError> {
    let product = catalog
        .get_product_by_id(id)
        .await
        .ok_or_else(|| StorefrontError::NotFound(format!("product {id}")))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&product)?);
        return Ok(());
    }

    println!("{} [{}]", product.name, product.id);
    println!("{}", product.description);
    println!();
    println!("Price:       {}", format_price(product.price));
    println!("Category:    {}", product.category.name);
    println!("Rating:      {:.1} ({} reviews)", product.rating, product.reviews);
    println!("Stock:       {}", product.stock);
    if !product.sizes.is_empty() {
        println!("Sizes:       {}", product.sizes.join(", "));
    }
    if !product.ingredients.is_empty() {
        println!("Ingredients: {}", product.ingredients.join(", "));
    }
    println!("Image:       {}", product.image);
    Ok(())
}

/// List categories.
pub async fn categories(catalog: &Catalog) {
    for category in catalog.get_categories().await {
        match &category.description {
            Some(description) => println!("{:<12} {:<14} {description}", category.id, category.name),
            None => println!("{:<12} {}", category.id, category.name),
        }
    }
}

/// Report where catalog data is coming from.
pub async fn status(catalog: &Catalog) {
    let products = catalog.get_all_products_with_origin().await;
    let categories = catalog.get_categories_with_origin().await;

    println!(
        "Content API: {}",
        if catalog.is_offline() {
            "not configured"
        } else {
            "configured"
        }
    );
    println!("Products:    {} ({})", products.data.len(), products.origin);
    println!("Categories:  {} ({})", categories.data.len(), categories.origin);

    for origin in [&products.origin, &categories.origin] {
        if let DataOrigin::Fallback(reason @ FallbackReason::Remote(_)) = origin {
            report_non_fatal(reason, "catalog status");
        }
    }
}

fn product_row(product: &Product) -> String {
    let mut flags = Vec::new();
    if product.featured {
        flags.push("featured");
    }
    if product.is_new {
        flags.push("new");
    }
    if product.is_sale {
        flags.push("sale");
    }

    format!(
        "{:<6} {:<32} {:>9}  {:<12} {}",
        product.id,
        product.name,
        format_price(product.price),
        product.category.id,
        flags.join(",")
    )
}
