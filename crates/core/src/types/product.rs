//! Canonical product type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::category::CategoryRef;
use super::id::{CategoryId, ProductId};

/// Rating shown when the source has none.
pub const DEFAULT_RATING: f64 = 4.5;

/// Stock level assumed when the source has none.
pub const DEFAULT_STOCK: u32 = 10;

/// A fully populated catalog product.
///
/// Every field holds a valid value; the catalog layer fills documented
/// defaults for anything the upstream record omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Unit price, never negative.
    pub price: Decimal,
    /// Image URL.
    pub image: String,
    /// First entry of `categories`, or the default category.
    pub category: CategoryRef,
    pub categories: Vec<CategoryId>,
    pub featured: bool,
    pub is_new: bool,
    pub is_sale: bool,
    pub ingredients: Vec<String>,
    pub rating: f64,
    pub reviews: u32,
    pub stock: u32,
    pub sizes: Vec<String>,
}

impl Product {
    /// Create a product with every optional attribute at its default.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            price: price.max(Decimal::ZERO),
            image: String::new(),
            category: CategoryRef::default(),
            categories: Vec::new(),
            featured: false,
            is_new: false,
            is_sale: false,
            ingredients: Vec::new(),
            rating: DEFAULT_RATING,
            reviews: 0,
            stock: DEFAULT_STOCK,
            sizes: Vec::new(),
        }
    }

    /// Whether the product belongs to `category_id`.
    ///
    /// Checks, case-insensitively, membership in `categories` and then the
    /// denormalized `category.id`. A bare-label category is normalized to
    /// `{id: label, name: label}`, so the id check covers it.
    #[must_use]
    pub fn in_category(&self, category_id: &str) -> bool {
        self.categories
            .iter()
            .any(|c| c.as_str().eq_ignore_ascii_case(category_id))
            || self.category.id.as_str().eq_ignore_ascii_case(category_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn soap() -> Product {
        let mut product = Product::new("p1", "Jabón de lavanda", Decimal::new(1250, 2));
        product.categories = vec![CategoryId::new("Jabones"), CategoryId::new("corporales")];
        product.category = CategoryRef::new("Jabones", "Jabones");
        product
    }

    #[test]
    fn test_new_applies_defaults() {
        let product = Product::new("p1", "Jabón", Decimal::TEN);
        assert!((product.rating - DEFAULT_RATING).abs() < f64::EPSILON);
        assert_eq!(product.stock, DEFAULT_STOCK);
        assert_eq!(product.reviews, 0);
        assert_eq!(product.category, CategoryRef::default());
        assert!(!product.featured);
    }

    #[test]
    fn test_new_clamps_negative_price() {
        let product = Product::new("p1", "Jabón", Decimal::NEGATIVE_ONE);
        assert_eq!(product.price, Decimal::ZERO);
    }

    #[test]
    fn test_in_category_matches_membership_case_insensitive() {
        assert!(soap().in_category("jabones"));
        assert!(soap().in_category("CORPORALES"));
        assert!(!soap().in_category("faciales"));
    }

    #[test]
    fn test_in_category_matches_category_ref() {
        let mut product = Product::new("p2", "Bálsamo", Decimal::ONE);
        product.category = CategoryRef::new("regalos", "Regalos");
        assert!(product.in_category("REGALOS"));

        product.category = CategoryRef::new("cat-7", "Jabones");
        assert!(product.in_category("cat-7"));
        assert!(!product.in_category("jabones"));
    }

    #[test]
    fn test_uncategorized_product_not_in_default_name() {
        let product = Product::new("p3", "Sales", Decimal::ONE);
        assert!(!product.in_category("General"));
        assert!(product.in_category("default"));
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(soap()).unwrap_or_default();
        assert!(json.get("isNew").is_some());
        assert!(json.get("isSale").is_some());
        assert!(json.get("is_new").is_none());
    }
}
