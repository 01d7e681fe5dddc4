//! Normalization of raw content records into canonical products.
//!
//! Records are first decoded into [`RawProduct`], whose shape-varying fields
//! are untagged sum types with a catch-all variant, so decoding cannot fail on
//! any JSON input. Each variant is then mapped onto the canonical model.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Number, Value};
use soapery_core::{
    CategoryId, CategoryRef, DEFAULT_RATING, DEFAULT_STOCK, Product, ProductId,
};

/// Name used when a record has none.
pub const PLACEHOLDER_NAME: &str = "Producto sin nombre";

/// Description used when a record has none.
pub const PLACEHOLDER_DESCRIPTION: &str = "Sin descripción disponible";

/// Image used when a record has no resolvable URL.
pub const PLACEHOLDER_IMAGE: &str = "/images/placeholder.jpg";

// =============================================================================
// Raw Shapes
// =============================================================================

/// A value of type `T`, or anything else.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Valid(T),
    Invalid(Value),
}

impl<T> Lenient<T> {
    fn valid(self) -> Option<T> {
        match self {
            Self::Valid(value) => Some(value),
            Self::Invalid(_) => None,
        }
    }
}

/// A list, or a single bare element standing in for a one-element list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }
}

/// Numbers arrive as JSON numbers or numeric strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(Number),
    Text(String),
    Other(Value),
}

impl RawNumber {
    fn to_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Number(n) => parse_decimal(&n.to_string()),
            Self::Text(s) => parse_decimal(s),
            Self::Other(_) => None,
        }
    }

    fn to_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            Self::Text(s) => s.trim().parse::<f64>().ok(),
            Self::Other(_) => None,
        }
        .filter(|f| f.is_finite())
    }

    fn to_u32(&self) -> Option<u32> {
        match self {
            Self::Number(n) => n
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .or_else(|| n.as_f64().and_then(whole_u32)),
            Self::Text(s) => s.trim().parse::<u32>().ok(),
            Self::Other(_) => None,
        }
    }
}

/// IDs arrive as strings or numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(Number),
    Other(Value),
}

impl RawId {
    fn into_string(self) -> Option<String> {
        match self {
            Self::Text(s) => non_blank(s),
            Self::Number(n) => Some(n.to_string()),
            Self::Other(_) => None,
        }
    }
}

/// Images arrive as a bare URL, a gallery, or an asset object.
///
/// `Gallery` precedes `Asset` so arrays are never read as positional structs.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawImage {
    Url(String),
    Gallery(Vec<RawImage>),
    Asset { url: Option<Lenient<String>> },
    Other(Value),
}

impl RawImage {
    fn into_url(self) -> Option<String> {
        match self {
            Self::Url(url) => non_blank(url),
            Self::Gallery(images) => images.into_iter().find_map(Self::into_url),
            Self::Asset { url } => url.and_then(Lenient::valid).and_then(non_blank),
            Self::Other(_) => None,
        }
    }
}

/// Categories arrive as bare labels or `{id, name}` references.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawCategory {
    Name(String),
    Ref {
        id: Option<RawId>,
        name: Option<Lenient<String>>,
    },
    Other(Value),
}

impl RawCategory {
    fn into_ref(self) -> Option<CategoryRef> {
        match self {
            Self::Name(label) => non_blank(label).map(|label| CategoryRef::new(label.clone(), label)),
            Self::Ref { id, name } => {
                let id = id.and_then(RawId::into_string);
                let name = name.and_then(Lenient::valid).and_then(non_blank);
                match (id, name) {
                    (Some(id), Some(name)) => Some(CategoryRef::new(id, name)),
                    (Some(label), None) | (None, Some(label)) => {
                        Some(CategoryRef::new(label.clone(), label))
                    }
                    (None, None) => None,
                }
            }
            Self::Other(_) => None,
        }
    }
}

/// Text entries in string lists.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawText {
    Text(String),
    Other(Value),
}

impl RawText {
    fn into_string(self) -> Option<String> {
        match self {
            Self::Text(s) => non_blank(s),
            Self::Other(_) => None,
        }
    }
}

/// A product record as the content source may send it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawProduct {
    id: Option<RawId>,
    name: Option<Lenient<String>>,
    description: Option<Lenient<String>>,
    price: Option<RawNumber>,
    image: Option<RawImage>,
    category: Option<RawCategory>,
    categories: Option<OneOrMany<RawCategory>>,
    featured: Option<Lenient<bool>>,
    is_new: Option<Lenient<bool>>,
    is_sale: Option<Lenient<bool>>,
    ingredients: Option<OneOrMany<RawText>>,
    rating: Option<RawNumber>,
    reviews: Option<RawNumber>,
    stock: Option<RawNumber>,
    sizes: Option<OneOrMany<RawText>>,
}

impl RawProduct {
    /// Decode any JSON value; non-records decode to the all-defaults record.
    fn decode(value: &Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        Self::deserialize(value).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Undecodable product record, using defaults");
            Self::default()
        })
    }

    /// Category references in source order.
    ///
    /// `categories` wins; a singular `category` seeds the list when it is
    /// absent or empty.
    fn category_refs(&mut self) -> Vec<CategoryRef> {
        let listed: Vec<CategoryRef> = self
            .categories
            .take()
            .map(OneOrMany::into_vec)
            .unwrap_or_default()
            .into_iter()
            .filter_map(RawCategory::into_ref)
            .collect();

        if listed.is_empty() {
            self.category
                .take()
                .and_then(RawCategory::into_ref)
                .into_iter()
                .collect()
        } else {
            listed
        }
    }
}

// =============================================================================
// Normalization
// =============================================================================

/// Build a canonical product from an arbitrary JSON record.
///
/// Total: every input, including `{}`, `null` and non-objects, yields a fully
/// populated product.
#[must_use]
pub fn normalize_product(value: &Value) -> Product {
    let mut raw = RawProduct::decode(value);
    let refs = raw.category_refs();

    let id = raw
        .id
        .and_then(RawId::into_string)
        .map_or_else(generate_id, ProductId::new);

    let category = refs.first().cloned().unwrap_or_default();
    let categories = refs.into_iter().map(|r| r.id).collect::<Vec<CategoryId>>();

    Product {
        id,
        name: text_or(raw.name, PLACEHOLDER_NAME),
        description: text_or(raw.description, PLACEHOLDER_DESCRIPTION),
        price: raw
            .price
            .as_ref()
            .and_then(RawNumber::to_decimal)
            .map_or(Decimal::ZERO, |price| price.max(Decimal::ZERO)),
        image: raw
            .image
            .and_then(RawImage::into_url)
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        category,
        categories,
        featured: flag(raw.featured),
        is_new: flag(raw.is_new),
        is_sale: flag(raw.is_sale),
        ingredients: strings(raw.ingredients),
        rating: raw
            .rating
            .as_ref()
            .and_then(RawNumber::to_f64)
            .unwrap_or(DEFAULT_RATING),
        reviews: raw.reviews.as_ref().and_then(RawNumber::to_u32).unwrap_or(0),
        stock: raw
            .stock
            .as_ref()
            .and_then(RawNumber::to_u32)
            .unwrap_or(DEFAULT_STOCK),
        sizes: strings(raw.sizes),
    }
}

/// Normalize a batch of records, preserving order.
#[must_use]
pub fn normalize_products(records: &[Value]) -> Vec<Product> {
    records.iter().map(normalize_product).collect()
}

/// Category references of a record, without building a full product.
#[must_use]
pub fn extract_categories(value: &Value) -> Vec<CategoryRef> {
    RawProduct::decode(value).category_refs()
}

// =============================================================================
// Helper Functions
// =============================================================================

fn generate_id() -> ProductId {
    ProductId::new(uuid::Uuid::new_v4().to_string())
}

fn non_blank(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == s.len() {
        Some(s)
    } else {
        Some(trimmed.to_string())
    }
}

fn text_or(field: Option<Lenient<String>>, placeholder: &str) -> String {
    field
        .and_then(Lenient::valid)
        .and_then(non_blank)
        .unwrap_or_else(|| placeholder.to_string())
}

fn flag(field: Option<Lenient<bool>>) -> bool {
    field.and_then(Lenient::valid).unwrap_or(false)
}

fn strings(field: Option<OneOrMany<RawText>>) -> Vec<String> {
    field
        .map(OneOrMany::into_vec)
        .unwrap_or_default()
        .into_iter()
        .filter_map(RawText::into_string)
        .collect()
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // range checked above the cast
fn whole_u32(f: f64) -> Option<u32> {
    (f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX)).then(|| f as u32)
}
