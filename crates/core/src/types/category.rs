//! Category types.

use serde::{Deserialize, Serialize};

use super::id::CategoryId;

/// ID of the synthetic "all products" category.
///
/// It never exists in the content source; listings prepend it locally.
pub const ALL_CATEGORY_ID: &str = "todos";

/// Display name of the synthetic "all products" category.
pub const ALL_CATEGORY_NAME: &str = "Todos";

/// ID of the category assigned to products without any category data.
pub const DEFAULT_CATEGORY_ID: &str = "default";

/// Name of the category assigned to products without any category data.
pub const DEFAULT_CATEGORY_NAME: &str = "General";

/// A category as listed in navigation and filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Category {
    /// Create a category without a description.
    #[must_use]
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
        }
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The synthetic "all products" category.
    #[must_use]
    pub fn all() -> Self {
        Self::new(ALL_CATEGORY_ID, ALL_CATEGORY_NAME)
            .with_description("Todos nuestros productos artesanales")
    }

    /// Whether this is the synthetic "all products" category.
    #[must_use]
    pub fn is_all(&self) -> bool {
        self.id.as_str() == ALL_CATEGORY_ID
    }
}

/// Denormalized category carried on each product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
}

impl CategoryRef {
    #[must_use]
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl Default for CategoryRef {
    fn default() -> Self {
        Self::new(DEFAULT_CATEGORY_ID, DEFAULT_CATEGORY_NAME)
    }
}

impl From<CategoryRef> for Category {
    fn from(category: CategoryRef) -> Self {
        Self::new(category.id, category.name)
    }
}
