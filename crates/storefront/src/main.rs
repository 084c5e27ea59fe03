use std::sync::Arc;

use anyhow::Context;

use phytoshop_events::InMemoryEventBus;
use phytoshop_products::{Catalog, CatalogQuery, parse_catalog_rows};
use phytoshop_storefront::{Session, StorefrontConfig};

/// Load a catalog export, put one of every listed product in a fresh cart and
/// print the checkout summary.
fn main() -> anyhow::Result<()> {
    let config = StorefrontConfig::from_env();
    phytoshop_observability::init_with(config.log_format, "info");

    let path = std::env::args()
        .nth(1)
        .context("usage: phytoshop <catalog.json>")?;
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read catalog at {path}"))?;
    let catalog = Catalog::new(
        parse_catalog_rows(&raw).with_context(|| format!("failed to parse catalog at {path}"))?,
        Vec::new(),
    );
    tracing::info!(products = catalog.products().len(), "catalog loaded");

    let mut session = Session::start(config, Arc::new(InMemoryEventBus::new()));
    let listed: Vec<_> = session
        .search(&catalog, &CatalogQuery::default())
        .into_iter()
        .cloned()
        .collect();
    for product in listed {
        session.add_to_cart(product, 1)?;
    }

    let summary = session.checkout_summary();
    let config = session.config();
    for line in session.cart().lines() {
        println!(
            "{:>3} x {:<40} {:>14}",
            line.quantity(),
            line.product().name(),
            config.format_price(line.line_total())
        );
    }
    println!("Articles:   {}", summary.total_items);
    println!("Sous-total: {}", config.format_price(summary.subtotal));
    println!("Livraison:  {}", config.format_price(summary.delivery_fee));
    println!("Total:      {}", config.format_price(summary.total));

    session.end();
    Ok(())
}
