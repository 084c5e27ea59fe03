//! One storefront session: the single owner of the cart.
//!
//! A `Session` is created once when the app starts and handed to screens by
//! reference. It ends through [`Session::end`], which consumes it; cart state
//! never outlives the session.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value, json};

use phytoshop_cart::Cart;
use phytoshop_core::{
    Aggregate, AggregateId, DomainError, DomainResult, ProductId, SessionId, UserId,
};
use phytoshop_events::{BehaviorTracker, InMemoryEventBus, TrackingEvent};
use phytoshop_orders::{
    CheckoutRequest, CheckoutSummary, CustomerInfo, Order, OrderCommand, OrderId, PaymentMethod,
    checkout,
};
use phytoshop_products::{Catalog, CatalogQuery, Product};

use crate::config::StorefrontConfig;

/// Bus carrying tracking events out of the session.
pub type TrackingBus = Arc<InMemoryEventBus<TrackingEvent>>;

/// What is left once a session ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub orders_placed: usize,
    /// Units still in the cart when the session ended.
    pub abandoned_items: u64,
}

#[derive(Debug)]
pub struct Session {
    id: SessionId,
    config: StorefrontConfig,
    cart: Cart,
    tracker: BehaviorTracker<TrackingBus>,
    orders: Vec<Order>,
    started_at: DateTime<Utc>,
}

impl Session {
    pub fn start(config: StorefrontConfig, bus: TrackingBus) -> Self {
        let id = SessionId::new();
        tracing::info!(session_id = %id, "session started");
        Self {
            id,
            config,
            cart: Cart::new(),
            tracker: BehaviorTracker::new(bus, id),
            orders: Vec::new(),
            started_at: Utc::now(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.tracker.user_id()
    }

    pub fn sign_in(&mut self, user_id: UserId) {
        tracing::info!(session_id = %self.id, %user_id, "user signed in");
        self.tracker.set_user(Some(user_id));
    }

    /// Signing out keeps the cart; only tracking stops.
    pub fn sign_out(&mut self) {
        tracing::info!(session_id = %self.id, "user signed out");
        self.tracker.set_user(None);
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Add a product snapshot to the cart.
    ///
    /// The shop never offers out-of-stock products, so they are rejected here;
    /// the cart itself takes whatever it is given.
    pub fn add_to_cart(&mut self, product: Product, quantity: u32) -> DomainResult<()> {
        if !product.is_purchasable() {
            return Err(DomainError::validation(format!(
                "product {} is out of stock",
                product.id_typed()
            )));
        }
        if quantity == 0 {
            return Ok(());
        }

        self.tracker.track_add_to_cart(
            product.id_typed(),
            metadata([
                ("category", json!(product.category())),
                ("price", json!(product.price().francs())),
                ("quantity", json!(quantity)),
            ]),
        );
        self.cart.add_to_cart(product, quantity);
        Ok(())
    }

    pub fn remove_from_cart(&mut self, product_id: &ProductId) {
        self.cart.remove_from_cart(product_id);
    }

    pub fn update_quantity(&mut self, product_id: &ProductId, new_quantity: i64) {
        self.cart.update_quantity(product_id, new_quantity);
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear_cart();
    }

    pub fn view_product(&self, product: &Product) {
        self.tracker.track_product_view(
            product.id_typed(),
            metadata([("category", json!(product.category()))]),
        );
    }

    pub fn like_product(&self, product: &Product) {
        self.tracker.track_like(product.id_typed(), Map::new());
    }

    /// Run a shop query; non-blank searches are tracked.
    pub fn search<'c>(&self, catalog: &'c Catalog, query: &CatalogQuery) -> Vec<&'c Product> {
        let results = catalog.query(query);
        if !query.search.trim().is_empty() {
            let category = query.category.as_ref().map(|c| c.as_str());
            self.tracker.track_search(
                query.search.trim(),
                metadata([
                    ("selected_category", json!(category)),
                    ("results", json!(results.len())),
                ]),
            );
        }
        results
    }

    pub fn checkout_summary(&self) -> CheckoutSummary {
        CheckoutSummary::from_cart(&self.cart, self.config.delivery_fee)
    }

    /// Blank checkout form with the configured city pre-filled.
    pub fn blank_customer(&self) -> CustomerInfo {
        CustomerInfo::new("", "", "", self.config.default_city.clone())
    }

    /// Place an order from the cart. On success the cart is empty and one
    /// purchase event per line has been tracked.
    pub fn checkout(
        &mut self,
        customer: CustomerInfo,
        payment_method: PaymentMethod,
    ) -> DomainResult<&Order> {
        let request = CheckoutRequest {
            order_id: OrderId::new(AggregateId::new()),
            session_id: self.id,
            user_id: self.user_id(),
            customer,
            payment_method,
            delivery_fee: self.config.delivery_fee,
            occurred_at: Utc::now(),
        };

        let order = checkout(&mut self.cart, request)?;
        for line in order.lines() {
            self.tracker.track_purchase(
                &line.product_id,
                metadata([
                    ("order_id", json!(order.id_typed().to_string())),
                    ("quantity", json!(line.quantity)),
                    ("unit_price", json!(line.unit_price.francs())),
                ]),
            );
        }

        self.orders.push(order);
        let placed = self.orders.len() - 1;
        Ok(&self.orders[placed])
    }

    /// Orders placed in this session, oldest first.
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Apply a status update received for one of this session's orders.
    pub fn update_order(&mut self, command: OrderCommand) -> DomainResult<&Order> {
        let order_id = command.order_id();
        let order = self
            .orders
            .iter_mut()
            .find(|o| o.id_typed() == order_id)
            .ok_or_else(DomainError::not_found)?;
        order.execute(&command)?;
        tracing::info!(%order_id, status = ?order.status(), "order updated");
        Ok(order)
    }

    /// Look an order up by its carrier tracking code or by any part of its id,
    /// such as the short `#XXXXXXXX` reference shown to the shopper. Input is
    /// trimmed and matched case-insensitively.
    pub fn track_order(&self, code: &str) -> Option<&Order> {
        let code = code.trim().trim_start_matches('#').to_lowercase();
        if code.is_empty() {
            return None;
        }
        self.orders.iter().find(|o| {
            o.tracking_code()
                .is_some_and(|t| t.eq_ignore_ascii_case(&code))
                || o.id_typed().to_string().contains(&code)
        })
    }

    /// Short reference displayed for an order: the last eight id characters,
    /// upper-cased.
    pub fn order_reference(order: &Order) -> String {
        let id = order.id_typed().to_string();
        id[id.len().saturating_sub(8)..].to_uppercase()
    }

    /// End the session; the cart is dropped with it.
    pub fn end(self) -> SessionSummary {
        let summary = SessionSummary {
            session_id: self.id,
            started_at: self.started_at,
            ended_at: Utc::now(),
            orders_placed: self.orders.len(),
            abandoned_items: self.cart.total_items(),
        };
        tracing::info!(
            session_id = %summary.session_id,
            orders = summary.orders_placed,
            abandoned_items = summary.abandoned_items,
            "session ended"
        );
        summary
    }
}

fn metadata<const N: usize>(pairs: [(&str, Value); N]) -> Map<String, Value> {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use phytoshop_core::Money;
    use phytoshop_events::{EventBus, TrackingAction};

    fn product(id: &str, price: u64) -> Product {
        Product::new(ProductId::parse(id).unwrap(), format!("Produit {id}"), Money::from_francs(price))
    }

    fn session() -> Session {
        Session::start(StorefrontConfig::default(), Arc::new(InMemoryEventBus::new()))
    }

    #[test]
    fn out_of_stock_products_are_rejected_at_session_boundary() {
        let mut session = session();
        let err = session
            .add_to_cart(product("A", 1000).with_stock(false), 1)
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(session.cart().is_empty());
    }

    #[test]
    fn anonymous_add_to_cart_is_not_tracked() {
        let bus: TrackingBus = Arc::new(InMemoryEventBus::new());
        let sub = bus.subscribe();
        let mut session = Session::start(StorefrontConfig::default(), bus);

        session.add_to_cart(product("A", 1000), 2).unwrap();
        assert_eq!(session.cart().total_items(), 2);
        assert!(sub.drain().is_empty());
    }

    #[test]
    fn signed_in_add_to_cart_is_tracked_with_metadata() {
        let bus: TrackingBus = Arc::new(InMemoryEventBus::new());
        let sub = bus.subscribe();
        let mut session = Session::start(StorefrontConfig::default(), bus);
        session.sign_in(UserId::new());

        session.add_to_cart(product("A", 1500), 3).unwrap();

        let events = sub.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action_type, TrackingAction::AddToCart);
        assert_eq!(events[0].metadata["price"], json!(1500));
        assert_eq!(events[0].metadata["quantity"], json!(3));
    }

    #[test]
    fn zero_quantity_add_is_not_tracked() {
        let bus: TrackingBus = Arc::new(InMemoryEventBus::new());
        let sub = bus.subscribe();
        let mut session = Session::start(StorefrontConfig::default(), bus);
        session.sign_in(UserId::new());

        session.add_to_cart(product("A", 1000), 0).unwrap();
        assert!(session.cart().is_empty());
        assert!(sub.drain().is_empty());
    }

    #[test]
    fn orders_are_found_by_displayed_short_reference() {
        let mut session = session();
        session.add_to_cart(product("A", 1000), 1).unwrap();
        let customer = CustomerInfo::new("Mbuyi", "+243 810 000 000", "Kalamu", "Kinshasa");
        let order_id = session
            .checkout(customer, PaymentMethod::MobileMoney)
            .unwrap()
            .id_typed();

        let reference = Session::order_reference(&session.orders()[0]);
        assert_eq!(reference.len(), 8);
        assert_eq!(reference, reference.to_uppercase());

        let found = session.track_order(&reference).unwrap();
        assert_eq!(found.id_typed(), order_id);
        assert!(session.track_order(&format!(" #{reference} ")).is_some());
        assert!(session.track_order(&order_id.to_string().to_uppercase()).is_some());
        assert!(session.track_order("#").is_none());
    }

    #[test]
    fn blank_customer_uses_configured_city() {
        let config = StorefrontConfig {
            default_city: "Goma".to_string(),
            ..StorefrontConfig::default()
        };
        let session = Session::start(config, Arc::new(InMemoryEventBus::new()));
        assert_eq!(session.blank_customer().city, "Goma");
    }

    #[test]
    fn update_order_for_unknown_order_is_not_found() {
        let mut session = session();
        let err = session
            .update_order(OrderCommand::ConfirmOrder(phytoshop_orders::ConfirmOrder {
                order_id: OrderId::new(AggregateId::new()),
                occurred_at: Utc::now(),
            }))
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn end_reports_abandoned_items() {
        let mut session = session();
        session.add_to_cart(product("A", 1000), 4).unwrap();
        let id = session.id();

        let summary = session.end();
        assert_eq!(summary.session_id, id);
        assert_eq!(summary.abandoned_items, 4);
        assert_eq!(summary.orders_placed, 0);
        assert!(summary.ended_at >= summary.started_at);
    }
}
