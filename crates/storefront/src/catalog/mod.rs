//! Catalog access layer.
//!
//! Serves products and categories from the content API when it answers with
//! data, and from the bundled fallback dataset otherwise. Callers always get
//! canonical products; remote failures never cross this boundary.
//!
//! "Remote failed" and "remote empty" are deliberately treated alike. The
//! `*_with_origin` variants expose which one happened for monitoring without
//! changing what callers receive.

pub mod fallback;
pub mod normalize;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use soapery_core::{ALL_CATEGORY_ID, Category, Product};
use tracing::{debug, instrument, warn};

use crate::cms::{CmsClient, ContentSource};
use crate::config::CmsConfig;

pub use normalize::{extract_categories, normalize_product, normalize_products};

/// Why fallback data was served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// No content API is configured.
    NotConfigured,
    /// The content API answered without usable data.
    Empty,
    /// The content API call failed.
    Remote(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => f.write_str("content API not configured"),
            Self::Empty => f.write_str("content API returned no data"),
            Self::Remote(error) => write!(f, "content API error: {error}"),
        }
    }
}

impl std::error::Error for FallbackReason {}

/// Where a catalog result came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataOrigin {
    Live,
    Fallback(FallbackReason),
}

impl DataOrigin {
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }
}

impl fmt::Display for DataOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => f.write_str("live"),
            Self::Fallback(reason) => write!(f, "fallback ({reason})"),
        }
    }
}

/// A catalog result tagged with its origin.
#[derive(Debug, Clone)]
pub struct Sourced<T> {
    pub data: T,
    pub origin: DataOrigin,
}

impl<T> Sourced<T> {
    const fn live(data: T) -> Self {
        Self {
            data,
            origin: DataOrigin::Live,
        }
    }

    const fn fallback(data: T, reason: FallbackReason) -> Self {
        Self {
            data,
            origin: DataOrigin::Fallback(reason),
        }
    }

    /// Transform the data, keeping the origin.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Sourced<U> {
        Sourced {
            data: f(self.data),
            origin: self.origin,
        }
    }
}

/// Facade over the content API and the fallback dataset.
///
/// Cheap to clone; clones share the underlying source.
#[derive(Clone)]
pub struct Catalog {
    source: Option<Arc<dyn ContentSource>>,
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("offline", &self.source.is_none())
            .finish()
    }
}

impl Catalog {
    /// A catalog backed by `source`.
    #[must_use]
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self {
            source: Some(source),
        }
    }

    /// A catalog that always serves the fallback dataset.
    #[must_use]
    pub const fn offline() -> Self {
        Self { source: None }
    }

    /// A catalog over the configured content API, offline without an endpoint.
    #[must_use]
    pub fn from_config(config: &CmsConfig) -> Self {
        CmsClient::from_config(config).map_or_else(Self::offline, |client| {
            Self::new(Arc::new(client))
        })
    }

    #[must_use]
    pub const fn is_offline(&self) -> bool {
        self.source.is_none()
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Every product.
    pub async fn get_all_products(&self) -> Vec<Product> {
        self.get_all_products_with_origin().await.data
    }

    /// Every product, tagged with its origin.
    #[instrument(skip(self))]
    pub async fn get_all_products_with_origin(&self) -> Sourced<Vec<Product>> {
        let Some(source) = &self.source else {
            return fallback_products(FallbackReason::NotConfigured, "get_all_products");
        };

        match source.fetch_products().await {
            Ok(records) => {
                let products = normalize_products(&records);
                if products.is_empty() {
                    fallback_products(FallbackReason::Empty, "get_all_products")
                } else {
                    debug!(count = products.len(), "Serving live products");
                    Sourced::live(products)
                }
            }
            Err(e) => fallback_products(FallbackReason::Remote(e.to_string()), "get_all_products"),
        }
    }

    /// Products flagged as featured.
    pub async fn get_featured_products(&self) -> Vec<Product> {
        self.get_featured_products_with_origin().await.data
    }

    /// Featured products, tagged with their origin.
    #[instrument(skip(self))]
    pub async fn get_featured_products_with_origin(&self) -> Sourced<Vec<Product>> {
        let featured_fallback = |reason| {
            fallback_products(reason, "get_featured_products").map(only_featured)
        };

        let Some(source) = &self.source else {
            return featured_fallback(FallbackReason::NotConfigured);
        };

        match source.fetch_featured_products().await {
            Ok(records) => {
                let products = only_featured(normalize_products(&records));
                if products.is_empty() {
                    featured_fallback(FallbackReason::Empty)
                } else {
                    debug!(count = products.len(), "Serving live featured products");
                    Sourced::live(products)
                }
            }
            Err(e) => featured_fallback(FallbackReason::Remote(e.to_string())),
        }
    }

    /// A single product, `None` when neither source has it.
    pub async fn get_product_by_id(&self, id: &str) -> Option<Product> {
        self.get_product_by_id_with_origin(id).await.data
    }

    /// A single product, tagged with its origin.
    #[instrument(skip(self))]
    pub async fn get_product_by_id_with_origin(&self, id: &str) -> Sourced<Option<Product>> {
        let reason = match &self.source {
            None => FallbackReason::NotConfigured,
            Some(source) => match source.fetch_product(id).await {
                Ok(Some(record)) => return Sourced::live(Some(normalize_product(&record))),
                Ok(None) => FallbackReason::Empty,
                Err(e) => FallbackReason::Remote(e.to_string()),
            },
        };

        let found = fallback::products()
            .iter()
            .find(|product| product.id.as_str() == id)
            .cloned();

        match &found {
            Some(_) => warn!(reason = %reason, "Serving product from fallback catalog"),
            None => debug!(reason = %reason, "Product not found in any source"),
        }

        Sourced::fallback(found, reason)
    }

    /// Products in a category; `"todos"` means every product.
    pub async fn get_products_by_category(&self, category_id: &str) -> Vec<Product> {
        self.get_products_by_category_with_origin(category_id)
            .await
            .data
    }

    /// Products in a category, tagged with the origin of the product set.
    #[instrument(skip(self))]
    pub async fn get_products_by_category_with_origin(
        &self,
        category_id: &str,
    ) -> Sourced<Vec<Product>> {
        let all = self.get_all_products_with_origin().await;
        if category_id == ALL_CATEGORY_ID {
            return all;
        }

        all.map(|products| {
            products
                .into_iter()
                .filter(|product| product.in_category(category_id))
                .collect()
        })
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Every category, starting with the synthetic "all products" one.
    pub async fn get_categories(&self) -> Vec<Category> {
        self.get_categories_with_origin().await.data
    }

    /// Categories, tagged with their origin.
    #[instrument(skip(self))]
    pub async fn get_categories_with_origin(&self) -> Sourced<Vec<Category>> {
        let reason = match &self.source {
            None => FallbackReason::NotConfigured,
            Some(source) => match source.fetch_category_listing().await {
                Ok(records) => {
                    let derived = derive_categories(&records);
                    if derived.is_empty() {
                        FallbackReason::Empty
                    } else {
                        debug!(count = derived.len(), "Serving live categories");
                        let mut categories = Vec::with_capacity(derived.len() + 1);
                        categories.push(Category::all());
                        categories.extend(derived);
                        return Sourced::live(categories);
                    }
                }
                Err(e) => FallbackReason::Remote(e.to_string()),
            },
        };

        warn!(reason = %reason, "Serving fallback categories");
        Sourced::fallback(fallback::categories(), reason)
    }
}

/// Unique categories across records, in first-seen order, excluding the
/// synthetic one.
fn derive_categories(records: &[serde_json::Value]) -> Vec<Category> {
    let mut seen = HashSet::new();
    records
        .iter()
        .flat_map(extract_categories)
        .filter(|category| category.id.as_str() != ALL_CATEGORY_ID)
        .filter(|category| seen.insert(category.id.clone()))
        .map(Category::from)
        .collect()
}

fn only_featured(products: Vec<Product>) -> Vec<Product> {
    products.into_iter().filter(|p| p.featured).collect()
}

fn fallback_products(reason: FallbackReason, operation: &'static str) -> Sourced<Vec<Product>> {
    warn!(reason = %reason, operation, "Serving fallback catalog");
    Sourced::fallback(fallback::products().to_vec(), reason)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;
    use serde_json::{Value, json};

    use super::*;
    use crate::cms::CmsError;

    /// In-memory content source with a fixed behaviour.
    enum FakeSource {
        Records(Vec<Value>),
        Failing,
    }

    #[async_trait]
    impl ContentSource for FakeSource {
        async fn fetch_products(&self) -> Result<Vec<Value>, CmsError> {
            match self {
                Self::Records(records) => Ok(records.clone()),
                Self::Failing => Err(CmsError::message("connection reset")),
            }
        }

        async fn fetch_featured_products(&self) -> Result<Vec<Value>, CmsError> {
            let all = self.fetch_products().await?;
            Ok(all
                .into_iter()
                .filter(|r| r.get("featured") == Some(&Value::Bool(true)))
                .collect())
        }

        async fn fetch_product(&self, id: &str) -> Result<Option<Value>, CmsError> {
            let all = self.fetch_products().await?;
            Ok(all
                .into_iter()
                .find(|r| r.get("id").and_then(Value::as_str) == Some(id)))
        }

        async fn fetch_category_listing(&self) -> Result<Vec<Value>, CmsError> {
            self.fetch_products().await
        }
    }

    fn live_records() -> Vec<Value> {
        vec![
            json!({"id": "r1", "name": "Jabón de Ciprés", "price": 9, "categories": ["Jabones"], "featured": true}),
            json!({"id": "r2", "name": "Tónico de Hamamelis", "price": "14.50", "categories": ["faciales", "jabones"]}),
            json!({"id": "r3", "name": "Vela de Soja", "price": 12, "category": {"id": "hogar", "name": "Hogar"}}),
        ]
    }

    fn live_catalog() -> Catalog {
        Catalog::new(Arc::new(FakeSource::Records(live_records())))
    }

    fn failing_catalog() -> Catalog {
        Catalog::new(Arc::new(FakeSource::Failing))
    }

    fn empty_catalog() -> Catalog {
        Catalog::new(Arc::new(FakeSource::Records(vec![])))
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_all_products_live() {
        let result = live_catalog().get_all_products_with_origin().await;
        assert!(result.origin.is_live());
        assert_eq!(ids(&result.data), vec!["r1", "r2", "r3"]);
    }

    #[tokio::test]
    async fn test_all_products_fallback_on_error() {
        let result = failing_catalog().get_all_products_with_origin().await;
        assert!(matches!(
            result.origin,
            DataOrigin::Fallback(FallbackReason::Remote(_))
        ));
        assert_eq!(result.data, fallback::products());
    }

    #[tokio::test]
    async fn test_all_products_fallback_on_empty() {
        let result = empty_catalog().get_all_products_with_origin().await;
        assert_eq!(result.origin, DataOrigin::Fallback(FallbackReason::Empty));
        assert_eq!(result.data, fallback::products());
    }

    #[tokio::test]
    async fn test_offline_catalog_uses_fallback() {
        let catalog = Catalog::offline();
        assert!(catalog.is_offline());
        let result = catalog.get_all_products_with_origin().await;
        assert_eq!(
            result.origin,
            DataOrigin::Fallback(FallbackReason::NotConfigured)
        );
        assert_eq!(result.data.len(), fallback::products().len());
    }

    #[tokio::test]
    async fn test_featured_live_and_fallback() {
        let live = live_catalog().get_featured_products().await;
        assert_eq!(ids(&live), vec!["r1"]);

        let fallback = failing_catalog().get_featured_products().await;
        assert!(!fallback.is_empty());
        assert!(fallback.iter().all(|p| p.featured));
    }

    #[tokio::test]
    async fn test_featured_falls_back_when_remote_has_none() {
        let catalog = Catalog::new(Arc::new(FakeSource::Records(vec![json!({"id": "x"})])));
        let result = catalog.get_featured_products_with_origin().await;
        assert_eq!(result.origin, DataOrigin::Fallback(FallbackReason::Empty));
        assert!(result.data.iter().all(|p| p.featured));
    }

    #[tokio::test]
    async fn test_product_by_id_live() {
        let result = live_catalog().get_product_by_id_with_origin("r2").await;
        assert!(result.origin.is_live());
        assert_eq!(result.data.unwrap().name, "Tónico de Hamamelis");
    }

    #[tokio::test]
    async fn test_product_by_id_remote_miss_searches_fallback() {
        let result = live_catalog().get_product_by_id_with_origin("1").await;
        assert_eq!(result.origin, DataOrigin::Fallback(FallbackReason::Empty));
        assert_eq!(result.data.unwrap().name, "Jabón de Lavanda");
    }

    #[tokio::test]
    async fn test_product_by_id_error_searches_fallback() {
        let product = failing_catalog().get_product_by_id("4").await;
        assert_eq!(product.unwrap().id.as_str(), "4");
    }

    #[tokio::test]
    async fn test_product_by_id_missing_everywhere() {
        assert!(live_catalog().get_product_by_id("missing-id").await.is_none());
        assert!(failing_catalog().get_product_by_id("missing-id").await.is_none());
        assert!(Catalog::offline().get_product_by_id("missing-id").await.is_none());
    }

    #[tokio::test]
    async fn test_products_by_all_category_matches_all_products() {
        for catalog in [live_catalog(), failing_catalog(), Catalog::offline()] {
            let all = catalog.get_all_products().await;
            let todos = catalog.get_products_by_category(ALL_CATEGORY_ID).await;
            assert_eq!(ids(&todos), ids(&all));
        }
    }

    #[tokio::test]
    async fn test_products_by_category_case_insensitive() {
        let jabones = live_catalog().get_products_by_category("JABONES").await;
        assert_eq!(ids(&jabones), vec!["r1", "r2"]);

        let hogar = live_catalog().get_products_by_category("hogar").await;
        assert_eq!(ids(&hogar), vec!["r3"]);
    }

    #[tokio::test]
    async fn test_products_by_category_ignores_category_names() {
        let catalog = Catalog::new(Arc::new(FakeSource::Records(vec![
            json!({"id": "a", "category": {"id": "cat-7", "name": "Jabones"}}),
            json!({"id": "b"}),
        ])));

        assert!(catalog.get_products_by_category("jabones").await.is_empty());
        assert!(catalog.get_products_by_category("General").await.is_empty());
        assert_eq!(ids(&catalog.get_products_by_category("CAT-7").await), vec!["a"]);
    }

    #[tokio::test]
    async fn test_products_by_unknown_category_is_empty() {
        assert!(live_catalog()
            .get_products_by_category("velas-aromaticas")
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn test_products_by_category_on_fallback() {
        let regalos = failing_catalog().get_products_by_category("regalos").await;
        assert!(!regalos.is_empty());
        assert!(regalos.iter().all(|p| p.in_category("regalos")));
    }

    #[tokio::test]
    async fn test_categories_live_are_deduplicated_and_prefixed() {
        let result = live_catalog().get_categories_with_origin().await;
        assert!(result.origin.is_live());
        let listed: Vec<&str> = result.data.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(listed, vec!["todos", "Jabones", "faciales", "jabones", "hogar"]);
        assert_eq!(result.data.last().map(|c| c.name.as_str()), Some("Hogar"));
    }

    #[tokio::test]
    async fn test_categories_remote_todos_is_not_duplicated() {
        let catalog = Catalog::new(Arc::new(FakeSource::Records(vec![
            json!({"categories": ["todos", "jabones"]}),
        ])));
        let listed: Vec<String> = catalog
            .get_categories()
            .await
            .into_iter()
            .map(|c| c.id.into_inner())
            .collect();
        assert_eq!(listed, vec!["todos", "jabones"]);
    }

    #[tokio::test]
    async fn test_categories_fallback_on_error_and_empty() {
        let failed = failing_catalog().get_categories_with_origin().await;
        assert!(matches!(
            failed.origin,
            DataOrigin::Fallback(FallbackReason::Remote(_))
        ));
        assert_eq!(failed.data, fallback::categories());

        let uncategorized = Catalog::new(Arc::new(FakeSource::Records(vec![json!({"id": "x"})])));
        let result = uncategorized.get_categories_with_origin().await;
        assert_eq!(result.origin, DataOrigin::Fallback(FallbackReason::Empty));
    }

    #[test]
    fn test_origin_display() {
        assert_eq!(DataOrigin::Live.to_string(), "live");
        assert_eq!(
            DataOrigin::Fallback(FallbackReason::Empty).to_string(),
            "fallback (content API returned no data)"
        );
    }
}
