//! GraphQL operations against the content API.
//!
//! The documents live in `graphql/products.graphql`; response payloads are
//! kept as raw JSON records so the catalog can normalize whatever shape the
//! content API returns.

use graphql_client::QueryBody;
use serde::{Deserialize, Serialize};

/// Every product operation, in one document.
pub const PRODUCTS_DOCUMENT: &str = include_str!("../../graphql/products.graphql");

/// Page size for list queries.
pub const PAGE_SIZE: i64 = 100;

/// Named operations within [`PRODUCTS_DOCUMENT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GetProducts,
    GetFeaturedProducts,
    GetProductById,
    GetProductCategories,
}

impl Operation {
    /// The `operationName` sent with the request.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::GetProducts => "GetProducts",
            Self::GetFeaturedProducts => "GetFeaturedProducts",
            Self::GetProductById => "GetProductById",
            Self::GetProductCategories => "GetProductCategories",
        }
    }

    /// Build the request body for this operation.
    #[must_use]
    pub fn body<V>(self, variables: V) -> QueryBody<V> {
        QueryBody {
            variables,
            query: PRODUCTS_DOCUMENT,
            operation_name: self.name(),
        }
    }
}

/// Variables for list queries.
#[derive(Debug, Clone, Serialize)]
pub struct ListVariables {
    pub first: i64,
}

impl Default for ListVariables {
    fn default() -> Self {
        Self { first: PAGE_SIZE }
    }
}

/// Variables for `GetProductById`.
#[derive(Debug, Clone, Serialize)]
pub struct ProductVariables {
    pub id: String,
}

/// `data` member of list responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductListData {
    #[serde(default)]
    pub products: Option<Vec<serde_json::Value>>,
}

/// `data` member of `GetProductById` responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductData {
    #[serde(default)]
    pub product: Option<serde_json::Value>,
}
