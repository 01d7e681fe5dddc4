//! Headless content API client.
//!
//! # Architecture
//!
//! - GraphQL over HTTPS: `graphql_client` request/response envelopes, `reqwest`
//!   for transport, optional bearer token
//! - The content API is the source of truth; responses are cached in memory
//!   via `moka` (default 5 minute TTL)
//! - Records come back as raw JSON: the catalog layer owns normalization
//!
//! # Example
//!
//! ```rust,ignore
//! use soapery_storefront::cms::{CmsClient, ContentSource};
//!
//! let client = CmsClient::from_config(&config.cms).expect("endpoint configured");
//! let records = client.fetch_products().await?;
//! ```

mod cache;
mod client;
pub mod queries;

pub use client::CmsClient;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when talking to the content API.
#[derive(Debug, Error)]
pub enum CmsError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Rate limited by the content API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

impl CmsError {
    /// Single-message GraphQL error.
    pub(crate) fn message(message: impl Into<String>) -> Self {
        Self::GraphQL(vec![GraphQLError {
            message: message.into(),
            locations: vec![],
            path: vec![],
        }])
    }
}

/// A GraphQL error returned by the content API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<Value>,
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut parts = Vec::new();

            if !e.message.is_empty() {
                parts.push(e.message.clone());
            }

            if !e.path.is_empty() {
                let path_str = e
                    .path
                    .iter()
                    .map(|p| match p {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                parts.push(format!("path: {path_str}"));
            }

            if let Some(loc) = e.locations.first() {
                parts.push(format!("at line {}:{}", loc.line, loc.column));
            }

            if parts.is_empty() {
                format!("[error {}]: (no details)", i + 1)
            } else {
                parts.join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// A remote source of raw product records.
///
/// Implemented by [`CmsClient`]; tests substitute in-memory sources.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Every product.
    async fn fetch_products(&self) -> Result<Vec<Value>, CmsError>;

    /// Products flagged as featured.
    async fn fetch_featured_products(&self) -> Result<Vec<Value>, CmsError>;

    /// A single product, `None` when the source has no such ID.
    async fn fetch_product(&self, id: &str) -> Result<Option<Value>, CmsError>;

    /// Every product, reduced to its category data.
    async fn fetch_category_listing(&self) -> Result<Vec<Value>, CmsError>;
}
