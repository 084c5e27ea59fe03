//! In-memory catalog and the shop screen's product query.

use serde::{Deserialize, Serialize};

use phytoshop_core::ProductId;

use crate::product::{Category, CategoryId, Product};

/// Shop filter: free-text search plus an optional category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogQuery {
    pub search: String,
    pub category: Option<CategoryId>,
}

impl CatalogQuery {
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search: text.into(),
            category: None,
        }
    }

    pub fn in_category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }

    fn matches(&self, product: &Product, needle: Option<&str>) -> bool {
        if !product.in_stock() {
            return false;
        }
        if let Some(category) = &self.category {
            if product.category_id() != Some(category) {
                return false;
            }
        }
        match needle {
            None => true,
            Some(needle) => {
                product.name().to_lowercase().contains(needle)
                    || product.description().to_lowercase().contains(needle)
            }
        }
    }
}

/// Read-only snapshot of the remote catalog; products and categories are
/// each sorted by name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    categories: Vec<Category>,
}

impl Catalog {
    pub fn new(mut products: Vec<Product>, mut categories: Vec<Category>) -> Self {
        products.sort_by(|a, b| a.name().cmp(b.name()));
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            products,
            categories,
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn find(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id_typed() == id)
    }

    /// Products visible in the shop for `query`.
    ///
    /// Search is a case-insensitive substring match on name or description; a
    /// blank search matches everything. Out-of-stock products are never listed.
    pub fn query(&self, query: &CatalogQuery) -> Vec<&Product> {
        let trimmed = query.search.trim();
        let needle = (!trimmed.is_empty()).then(|| trimmed.to_lowercase());
        self.products
            .iter()
            .filter(|p| query.matches(p, needle.as_deref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phytoshop_core::Money;

    fn cat(raw: &str) -> CategoryId {
        CategoryId::parse(raw).unwrap()
    }

    fn product(id: &str, name: &str, category: &str, in_stock: bool) -> Product {
        Product::new(ProductId::parse(id).unwrap(), name, Money::from_francs(1000))
            .with_description(format!("{name} traditionnel"))
            .with_category(Some(cat(category)), category)
            .with_stock(in_stock)
    }

    fn sample() -> Catalog {
        Catalog::new(
            vec![
                product("p-3", "Moringa", "feuilles", true),
                product("p-1", "Artemisia", "tisanes", true),
                product("p-2", "Kinkeliba", "tisanes", false),
                product("p-4", "Huile de neem", "huiles", true),
            ],
            vec![],
        )
    }

    fn ids(products: Vec<&Product>) -> Vec<&str> {
        products.into_iter().map(|p| p.id_typed().as_str()).collect()
    }

    #[test]
    fn blank_query_lists_in_stock_products_by_name() {
        let catalog = sample();
        assert_eq!(ids(catalog.query(&CatalogQuery::default())), ["p-1", "p-4", "p-3"]);
        assert_eq!(ids(catalog.query(&CatalogQuery::search("   "))), ["p-1", "p-4", "p-3"]);
    }

    #[test]
    fn search_is_case_insensitive_over_name_and_description() {
        let catalog = sample();
        assert_eq!(ids(catalog.query(&CatalogQuery::search("MORINGA"))), ["p-3"]);
        assert_eq!(ids(catalog.query(&CatalogQuery::search("traditionnel"))).len(), 3);
    }

    #[test]
    fn category_filter_excludes_out_of_stock() {
        let catalog = sample();
        let query = CatalogQuery::default().in_category(cat("tisanes"));
        assert_eq!(ids(catalog.query(&query)), ["p-1"]);
    }

    #[test]
    fn categories_are_listed_by_name() {
        let category = |id: &str, name: &str| Category {
            id: cat(id),
            name: name.to_string(),
            icon: "leaf".to_string(),
        };
        let catalog = Catalog::new(
            vec![],
            vec![
                category("c-3", "Tisanes"),
                category("c-1", "Huiles"),
                category("c-2", "Feuilles"),
            ],
        );
        let names: Vec<&str> = catalog.categories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Feuilles", "Huiles", "Tisanes"]);
    }

    #[test]
    fn find_returns_out_of_stock_products_too() {
        let catalog = sample();
        let found = catalog.find(&ProductId::parse("p-2").unwrap()).unwrap();
        assert_eq!(found.name(), "Kinkeliba");
        assert!(catalog.find(&ProductId::parse("missing").unwrap()).is_none());
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: query results are in-stock members of the catalog, in name order.
            #[test]
            fn query_returns_sorted_in_stock_subset(
                entries in prop::collection::vec(("[a-z]{1,8}", any::<bool>()), 0..20),
                search in "[a-z]{0,2}"
            ) {
                let products = entries
                    .iter()
                    .enumerate()
                    .map(|(i, (name, in_stock))| product(&format!("p-{i}"), name, "misc", *in_stock))
                    .collect();
                let catalog = Catalog::new(products, vec![]);

                let results = catalog.query(&CatalogQuery::search(search.clone()));
                prop_assert!(results.iter().all(|p| p.in_stock()));
                prop_assert!(results.windows(2).all(|w| w[0].name() <= w[1].name()));
                if search.is_empty() {
                    let in_stock = entries.iter().filter(|(_, s)| *s).count();
                    prop_assert_eq!(results.len(), in_stock);
                }
            }
        }
    }
}
