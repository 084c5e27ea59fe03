//! Products domain module.
//!
//! Holds the one canonical `Product` shape every other crate consumes, the
//! adapters that turn remote catalog rows into it, and the in-memory catalog
//! query used by the shop screen. No IO: callers hand in the JSON they fetched.

pub mod catalog;
pub mod product;
pub mod remote;

pub use catalog::{Catalog, CatalogQuery};
pub use phytoshop_core::ProductId;
pub use product::{Category, CategoryId, Product, UNCATEGORIZED};
pub use remote::{
    CatalogError, CatalogRow, CategoryRow, ProductPayload, parse_catalog_rows, parse_categories,
};
