//! Bundled static catalog served whenever the content API cannot be used.
//!
//! The dataset goes through the same normalization as remote records, so
//! fallback products are indistinguishable in shape from live ones.

use std::sync::LazyLock;

use serde_json::Value;
use soapery_core::{Category, Product};

use super::normalize::normalize_products;

const FALLBACK_PRODUCTS_JSON: &str = include_str!("../../data/fallback_products.json");

static FALLBACK_PRODUCTS: LazyLock<Vec<Product>> = LazyLock::new(|| {
    match serde_json::from_str::<Vec<Value>>(FALLBACK_PRODUCTS_JSON) {
        Ok(records) => normalize_products(&records),
        Err(e) => {
            tracing::error!(error = %e, "Bundled fallback catalog is not valid JSON");
            Vec::new()
        }
    }
});

/// The normalized fallback catalog.
#[must_use]
pub fn products() -> &'static [Product] {
    &FALLBACK_PRODUCTS
}

/// Fixed category listing used when categories cannot be derived remotely.
///
/// Starts with the synthetic "all products" category.
#[must_use]
pub fn categories() -> Vec<Category> {
    vec![
        Category::all(),
        Category::new("jabones", "Jabones").with_description("Jabones artesanales elaborados en frío"),
        Category::new("faciales", "Faciales")
            .with_description("Cuidado natural para el rostro y los labios"),
        Category::new("corporales", "Corporales")
            .with_description("Baño, cabello y cuidado del cuerpo"),
        Category::new("regalos", "Regalos").with_description("Cajas y detalles para regalar"),
    ]
}

#[cfg(test)]
mod tests {
    use soapery_core::{ALL_CATEGORY_ID, DEFAULT_STOCK};

    use super::*;

    #[test]
    fn test_dataset_parses_and_is_non_empty() {
        assert!(products().len() >= 9);
    }

    #[test]
    fn test_dataset_ids_are_unique_and_stable() {
        let mut ids: Vec<&str> = products().iter().map(|p| p.id.as_str()).collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
        assert!(ids.contains(&"1"));
    }

    #[test]
    fn test_dataset_images_are_resolved_from_both_shapes() {
        assert!(products().iter().all(|p| p.image.starts_with("/images/products/")));
    }

    #[test]
    fn test_dataset_defaults_fill_omitted_fields() {
        let romero = products().iter().find(|p| p.id.as_str() == "5");
        assert!(romero.is_some_and(|p| p.stock == DEFAULT_STOCK));
    }

    #[test]
    fn test_dataset_has_featured_products() {
        assert!(products().iter().any(|p| p.featured));
    }

    #[test]
    fn test_every_product_category_is_listed() {
        let listed = categories();
        for product in products() {
            for category in &product.categories {
                assert!(
                    listed.iter().any(|c| &c.id == category),
                    "category {category} missing from fallback listing"
                );
            }
        }
    }

    #[test]
    fn test_categories_start_with_all() {
        assert_eq!(
            categories().first().map(|c| c.id.as_str()),
            Some(ALL_CATEGORY_ID)
        );
    }
}
