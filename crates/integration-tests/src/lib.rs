//! Integration tests for Soapery.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p soapery-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_store` - Cart persistence through the storage backends
//! - `catalog_fallback` - Catalog behaviour against live, empty and failing
//!   content sources
//!
//! Shared fixtures live here so each test file stays focused on behaviour.

use std::path::PathBuf;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use soapery_core::Product;
use soapery_storefront::cms::{CmsError, ContentSource};

/// A product with every optional attribute at its default.
#[must_use]
pub fn product(id: &str, price: i64) -> Product {
    Product::new(id, format!("Jabón {id}"), Decimal::from(price))
}

/// A unique directory under the system temp dir. Not created.
#[must_use]
pub fn scratch_dir(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("soapery-it-{label}-{}", uuid::Uuid::new_v4()))
}

/// A content source with canned behaviour.
#[derive(Debug, Clone)]
pub enum StubSource {
    /// Answers every query from these records.
    Records(Vec<Value>),
    /// Fails every query with a rate-limit error.
    Failing,
}

impl StubSource {
    fn records(&self) -> Result<Vec<Value>, CmsError> {
        match self {
            Self::Records(records) => Ok(records.clone()),
            Self::Failing => Err(CmsError::RateLimited(30)),
        }
    }
}

#[async_trait]
impl ContentSource for StubSource {
    async fn fetch_products(&self) -> Result<Vec<Value>, CmsError> {
        self.records()
    }

    async fn fetch_featured_products(&self) -> Result<Vec<Value>, CmsError> {
        Ok(self
            .records()?
            .into_iter()
            .filter(|r| r.get("featured").and_then(Value::as_bool) == Some(true))
            .collect())
    }

    async fn fetch_product(&self, id: &str) -> Result<Option<Value>, CmsError> {
        Ok(self
            .records()?
            .into_iter()
            .find(|r| r.get("id").and_then(Value::as_str) == Some(id)))
    }

    async fn fetch_category_listing(&self) -> Result<Vec<Value>, CmsError> {
        self.records()
    }
}
