//! Cache types for content API responses.

/// Cache key for content API responses.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products,
    FeaturedProducts,
    Product(String),
    ProductCategories,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Vec<serde_json::Value>),
    Product(Box<serde_json::Value>),
}
