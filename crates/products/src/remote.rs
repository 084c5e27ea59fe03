//! Adapters from remote catalog shapes to the canonical [`Product`].
//!
//! The backend returns products in two shapes: table rows (snake_case, with
//! the category name nested under `categories`) and flattened payloads
//! (camelCase, category name inline). Both are normalized here so nothing
//! downstream depends on the remote schema.

use serde::Deserialize;
use serde_json::Number;
use thiserror::Error;

use phytoshop_core::{DomainError, Money, ProductId};

use crate::product::{Category, CategoryId, Product, UNCATEGORIZED};

/// Failure while ingesting remote catalog data.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("malformed catalog payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("product {product_id} has an invalid price: {value}")]
    InvalidPrice { product_id: String, value: String },
}

/// Nested category reference selected alongside a product row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryRef {
    #[serde(default)]
    pub name: Option<String>,
}

/// Product row as selected from the `products` table with its category name.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogRow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Number,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub categories: Option<CategoryRef>,
    #[serde(default)]
    pub usage: Option<String>,
    #[serde(default)]
    pub contraindications: Option<Vec<String>>,
    #[serde(default)]
    pub in_stock: bool,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub reviews: Option<u32>,
}

/// Flattened product payload (camelCase) used between screens.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Number,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub usage: String,
    #[serde(default)]
    pub contraindications: Vec<String>,
    #[serde(default)]
    pub in_stock: bool,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub reviews: u32,
}

/// Category row from the `categories` table.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
}

/// Convert a JSON price into whole francs.
///
/// Decimal prices are rounded to the nearest franc; negative or non-finite
/// values are rejected.
fn price_from_number(product_id: &str, value: &Number) -> Result<Money, CatalogError> {
    if let Some(francs) = value.as_u64() {
        return Ok(Money::from_francs(francs));
    }
    match value.as_f64() {
        Some(f) if f.is_finite() && f >= 0.0 && f <= u64::MAX as f64 => {
            Ok(Money::from_francs(f.round() as u64))
        }
        _ => Err(CatalogError::InvalidPrice {
            product_id: product_id.to_string(),
            value: value.to_string(),
        }),
    }
}

fn category_name(name: Option<String>) -> String {
    match name {
        Some(name) if !name.trim().is_empty() => name,
        _ => UNCATEGORIZED.to_string(),
    }
}

impl TryFrom<CatalogRow> for Product {
    type Error = CatalogError;

    fn try_from(row: CatalogRow) -> Result<Self, Self::Error> {
        let price = price_from_number(&row.id, &row.price)?;
        let id = ProductId::parse(row.id)?;
        let category_id = row.category_id.map(CategoryId::parse).transpose()?;
        let category = category_name(row.categories.and_then(|c| c.name));

        Ok(Product::new(id, row.name, price)
            .with_description(row.description.unwrap_or_default())
            .with_category(category_id, category)
            .with_image(row.image.unwrap_or_default())
            .with_usage(row.usage.unwrap_or_default())
            .with_contraindications(row.contraindications.unwrap_or_default())
            .with_stock(row.in_stock)
            .with_rating(row.rating.unwrap_or_default(), row.reviews.unwrap_or_default()))
    }
}

impl TryFrom<ProductPayload> for Product {
    type Error = CatalogError;

    fn try_from(payload: ProductPayload) -> Result<Self, Self::Error> {
        let price = price_from_number(&payload.id, &payload.price)?;
        let id = ProductId::parse(payload.id)?;

        Ok(Product::new(id, payload.name, price)
            .with_description(payload.description)
            .with_category(None, category_name(payload.category))
            .with_image(payload.image)
            .with_usage(payload.usage)
            .with_contraindications(payload.contraindications)
            .with_stock(payload.in_stock)
            .with_rating(payload.rating, payload.reviews))
    }
}

impl TryFrom<CategoryRow> for Category {
    type Error = CatalogError;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        Ok(Category {
            id: CategoryId::parse(row.id)?,
            name: row.name,
            icon: row.icon,
        })
    }
}

/// Parse a JSON array of product rows into canonical products.
///
/// The first malformed row fails the whole batch.
pub fn parse_catalog_rows(json: &str) -> Result<Vec<Product>, CatalogError> {
    let rows: Vec<CatalogRow> = serde_json::from_str(json)?;
    let products = rows
        .into_iter()
        .map(Product::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(count = products.len(), "catalog rows ingested");
    Ok(products)
}

/// Parse a JSON array of category rows.
pub fn parse_categories(json: &str) -> Result<Vec<Category>, CatalogError> {
    let rows: Vec<CategoryRow> = serde_json::from_str(json)?;
    rows.into_iter().map(Category::try_from).collect()
}
