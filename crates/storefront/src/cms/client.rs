//! Content API client implementation.
//!
//! Sends `graphql_client` query bodies with `reqwest` 0.13. Successful
//! responses are cached using `moka`; errors are never cached.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use graphql_client::Response;
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::config::CmsConfig;

use super::cache::{CacheKey, CacheValue};
use super::queries::{ListVariables, Operation, ProductData, ProductListData, ProductVariables};
use super::{CmsError, ContentSource, GraphQLError, GraphQLErrorLocation};

/// Client for the headless content API.
#[derive(Clone)]
pub struct CmsClient {
    inner: Arc<CmsClientInner>,
}

struct CmsClientInner {
    client: reqwest::Client,
    endpoint: Url,
    token: Option<SecretString>,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for CmsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CmsClient")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("authenticated", &self.inner.token.is_some())
            .finish_non_exhaustive()
    }
}

impl CmsClient {
    /// Create a new content API client.
    #[must_use]
    pub fn new(endpoint: Url, token: Option<SecretString>, cache_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(cache_ttl)
            .build();

        Self {
            inner: Arc::new(CmsClientInner {
                client: reqwest::Client::new(),
                endpoint,
                token,
                cache,
            }),
        }
    }

    /// Create a client from configuration, `None` when no endpoint is set.
    #[must_use]
    pub fn from_config(config: &CmsConfig) -> Option<Self> {
        config
            .endpoint
            .clone()
            .map(|endpoint| Self::new(endpoint, config.token.clone(), config.cache_ttl))
    }

    /// The configured endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Drop every cached response.
    pub fn invalidate_cache(&self) {
        self.inner.cache.invalidate_all();
    }

    /// Execute a GraphQL operation.
    async fn execute<V, D>(&self, operation: Operation, variables: V) -> Result<D, CmsError>
    where
        V: Serialize + Send,
        D: DeserializeOwned,
    {
        let request_body = operation.body(variables);

        let mut request = self
            .inner
            .client
            .post(self.inner.endpoint.clone())
            .header("Content-Type", "application/json")
            .json(&request_body);

        if let Some(token) = &self.inner.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CmsError::RateLimited(retry_after));
        }

        // Read the body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                operation = operation.name(),
                body = %truncate(&response_text, 500),
                "Content API returned non-success status"
            );
            return Err(CmsError::message(format!(
                "HTTP {status}: {}",
                truncate(&response_text, 200)
            )));
        }

        decode_response(operation, &response_text)
    }

    /// Get every product record.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the payload is malformed.
    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<Vec<Value>, CmsError> {
        self.list(CacheKey::Products, Operation::GetProducts).await
    }

    /// Get product records flagged as featured.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the payload is malformed.
    #[instrument(skip(self))]
    pub async fn get_featured_products(&self) -> Result<Vec<Value>, CmsError> {
        self.list(CacheKey::FeaturedProducts, Operation::GetFeaturedProducts)
            .await
    }

    /// Get product records carrying only their categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the payload is malformed.
    #[instrument(skip(self))]
    pub async fn get_product_categories(&self) -> Result<Vec<Value>, CmsError> {
        self.list(CacheKey::ProductCategories, Operation::GetProductCategories)
            .await
    }

    /// Get a product record by ID.
    ///
    /// Returns `Ok(None)` when the content API has no product with this ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the payload is malformed.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get_product(&self, id: &str) -> Result<Option<Value>, CmsError> {
        let cache_key = CacheKey::Product(id.to_string());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(Some(*product));
        }

        let data: ProductData = self
            .execute(
                Operation::GetProductById,
                ProductVariables { id: id.to_string() },
            )
            .await?;

        let Some(product) = data.product.filter(|p| !p.is_null()) else {
            debug!("Product not found in content API");
            return Ok(None);
        };

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(Some(product))
    }

    async fn list(&self, cache_key: CacheKey, operation: Operation) -> Result<Vec<Value>, CmsError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!(count = products.len(), "Cache hit for product list");
            return Ok(products);
        }

        let data: ProductListData = self.execute(operation, ListVariables::default()).await?;
        let products = data.products.unwrap_or_default();

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }
}

#[async_trait]
impl ContentSource for CmsClient {
    async fn fetch_products(&self) -> Result<Vec<Value>, CmsError> {
        self.get_products().await
    }

    async fn fetch_featured_products(&self) -> Result<Vec<Value>, CmsError> {
        self.get_featured_products().await
    }

    async fn fetch_product(&self, id: &str) -> Result<Option<Value>, CmsError> {
        self.get_product(id).await
    }

    async fn fetch_category_listing(&self) -> Result<Vec<Value>, CmsError> {
        self.get_product_categories().await
    }
}

/// Decode a GraphQL response body into its `data` member.
fn decode_response<D: DeserializeOwned>(
    operation: Operation,
    response_text: &str,
) -> Result<D, CmsError> {
    let response: Response<D> = match serde_json::from_str(response_text) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(
                error = %e,
                operation = operation.name(),
                body = %truncate(response_text, 500),
                "Failed to parse content API response"
            );
            return Err(CmsError::Parse(e));
        }
    };

    if let Some(errors) = response.errors
        && !errors.is_empty()
    {
        debug!(errors = ?errors, "GraphQL errors in response");

        return Err(CmsError::GraphQL(
            errors
                .into_iter()
                .map(|e| GraphQLError {
                    message: e.message,
                    locations: e.locations.map_or_else(Vec::new, |locs| {
                        locs.into_iter()
                            .map(|l| GraphQLErrorLocation {
                                line: i64::from(l.line),
                                column: i64::from(l.column),
                            })
                            .collect()
                    }),
                    path: e.path.map_or_else(Vec::new, |p| {
                        p.into_iter()
                            .map(|fragment| match fragment {
                                graphql_client::PathFragment::Key(s) => Value::String(s),
                                graphql_client::PathFragment::Index(i) => {
                                    Value::Number(i.into())
                                }
                            })
                            .collect()
                    }),
                })
                .collect(),
        ));
    }

    response.data.ok_or_else(|| {
        tracing::error!(
            operation = operation.name(),
            body = %truncate(response_text, 500),
            "Content API response has no data and no errors"
        );
        CmsError::message("No data in response")
    })
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_product_list() {
        let body = r#"{"data": {"products": [{"id": "p1"}, {"id": "p2"}]}}"#;
        let data: ProductListData = decode_response(Operation::GetProducts, body).unwrap();
        assert_eq!(data.products.unwrap().len(), 2);
    }

    #[test]
    fn test_decode_missing_product() {
        let body = r#"{"data": {"product": null}}"#;
        let data: ProductData = decode_response(Operation::GetProductById, body).unwrap();
        assert!(data.product.is_none());
    }

    #[test]
    fn test_decode_graphql_errors() {
        let body = r#"{
            "data": null,
            "errors": [{"message": "not allowed", "locations": [{"line": 2, "column": 3}], "path": ["products", 0]}]
        }"#;
        let err = decode_response::<ProductListData>(Operation::GetProducts, body).unwrap_err();
        assert_eq!(
            err.to_string(),
            "GraphQL errors: not allowed path: products.0 at line 2:3"
        );
    }

    #[test]
    fn test_decode_no_data() {
        let err = decode_response::<ProductListData>(Operation::GetProducts, "{}").unwrap_err();
        assert_eq!(err.to_string(), "GraphQL errors: No data in response");
    }

    #[test]
    fn test_decode_malformed_body() {
        let err =
            decode_response::<ProductListData>(Operation::GetProducts, "<html>oops</html>")
                .unwrap_err();
        assert!(matches!(err, CmsError::Parse(_)));
    }

    #[test]
    fn test_from_config_requires_endpoint() {
        assert!(CmsClient::from_config(&CmsConfig::default()).is_none());

        let config = CmsConfig {
            endpoint: Url::parse("https://cms.local/graphql").ok(),
            ..CmsConfig::default()
        };
        let client = CmsClient::from_config(&config).unwrap();
        assert_eq!(client.endpoint().as_str(), "https://cms.local/graphql");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        // Bind then drop a listener so the port is known to be closed
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let endpoint = Url::parse(&format!("http://127.0.0.1:{port}/graphql")).unwrap();
        let client = CmsClient::new(endpoint, None, Duration::from_secs(60));

        let err = client.get_products().await.unwrap_err();
        assert!(matches!(err, CmsError::Http(_)));
    }
}
