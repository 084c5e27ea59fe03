use serde::{Deserialize, Serialize};

use phytoshop_core::{DomainError, Entity, Money, ProductId};

/// Category label used when the remote row carries no category name.
pub const UNCATEGORIZED: &str = "Autre";

/// Category identifier, opaque and assigned by the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryId(String);

impl CategoryId {
    pub fn parse(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(DomainError::invalid_id("CategoryId: blank"));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CategoryId {
    type Error = DomainError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(raw)
    }
}

impl From<CategoryId> for String {
    fn from(id: CategoryId) -> Self {
        id.0
    }
}

impl core::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Product category (shop filter chip).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Icon name understood by the display layer.
    pub icon: String,
}

/// Canonical product snapshot.
///
/// Every remote shape is adapted into this type on ingestion (see
/// [`crate::remote`]); the cart and orders never see raw rows. A snapshot is
/// read-only for the rest of the system: the cart stores it by value and does
/// not re-validate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    description: String,
    category: String,
    category_id: Option<CategoryId>,
    price: Money,
    image: String,
    usage: String,
    contraindications: Vec<String>,
    in_stock: bool,
    rating: f32,
    reviews: u32,
}

impl Product {
    /// Minimal in-stock product; the remaining fields are filled with `with_*`.
    pub fn new(id: ProductId, name: impl Into<String>, price: Money) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            category: UNCATEGORIZED.to_string(),
            category_id: None,
            price,
            image: String::new(),
            usage: String::new(),
            contraindications: Vec::new(),
            in_stock: true,
            rating: 0.0,
            reviews: 0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, id: Option<CategoryId>, name: impl Into<String>) -> Self {
        self.category_id = id;
        self.category = name.into();
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn with_contraindications(mut self, contraindications: Vec<String>) -> Self {
        self.contraindications = contraindications;
        self
    }

    pub fn with_stock(mut self, in_stock: bool) -> Self {
        self.in_stock = in_stock;
        self
    }

    pub fn with_rating(mut self, rating: f32, reviews: u32) -> Self {
        self.rating = rating;
        self.reviews = reviews;
        self
    }

    pub fn id_typed(&self) -> &ProductId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Display name of the category.
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn category_id(&self) -> Option<&CategoryId> {
        self.category_id.as_ref()
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn contraindications(&self) -> &[String] {
        &self.contraindications
    }

    pub fn in_stock(&self) -> bool {
        self.in_stock
    }

    pub fn rating(&self) -> f32 {
        self.rating
    }

    pub fn reviews(&self) -> u32 {
        self.reviews
    }

    /// Whether the shop offers this product for sale.
    pub fn is_purchasable(&self) -> bool {
        self.in_stock
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
