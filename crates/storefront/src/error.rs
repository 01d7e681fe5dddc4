//! Unified error handling with Sentry integration.
//!
//! `StorefrontError` is what host applications see. Catalog outages never
//! reach it: they are absorbed by the fallback dataset and only reported.

use thiserror::Error;

use crate::cart::StorageError;
use crate::cms::CmsError;
use crate::config::ConfigError;

/// Top-level error type for the storefront.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Content API operation failed.
    #[error("Content API error: {0}")]
    Cms(#[from] CmsError),

    /// Cart persistence failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Output could not be serialized.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Checkout was attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,
}

impl StorefrontError {
    /// Whether the caller can carry on after this error.
    #[must_use]
    pub const fn is_non_fatal(&self) -> bool {
        matches!(self, Self::Cms(_) | Self::Storage(_))
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Log an error that did not stop the operation and send it to Sentry.
pub fn report_non_fatal<E>(error: &E, context: &str)
where
    E: std::error::Error + ?Sized,
{
    let event_id = sentry::capture_error(error);
    tracing::warn!(
        error = %error,
        context,
        sentry_event_id = %event_id,
        "Non-fatal error"
    );
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "add_to_cart", Some(&[("product_id", "3")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
