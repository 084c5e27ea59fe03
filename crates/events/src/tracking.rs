//! Shopper behavior tracking (feeds the remote recommendation service).
//!
//! Only signed-in shoppers are tracked. Tracking never fails from the
//! caller's point of view: publish errors are logged and dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use phytoshop_core::{ProductId, SessionId, UserId};

use crate::bus::EventBus;
use crate::event::Event;

/// What the shopper did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingAction {
    View,
    AddToCart,
    Purchase,
    Search,
    Like,
}

impl TrackingAction {
    pub fn as_str(self) -> &'static str {
        match self {
            TrackingAction::View => "view",
            TrackingAction::AddToCart => "add_to_cart",
            TrackingAction::Purchase => "purchase",
            TrackingAction::Search => "search",
            TrackingAction::Like => "like",
        }
    }
}

/// One behavior record, shaped like a `user_behavior_tracking` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub action_type: TrackingAction,
    pub user_id: UserId,
    pub session_id: SessionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub occurred_at: DateTime<Utc>,
}

impl Event for TrackingEvent {
    fn event_type(&self) -> &'static str {
        match self.action_type {
            TrackingAction::View => "tracking.view",
            TrackingAction::AddToCart => "tracking.add_to_cart",
            TrackingAction::Purchase => "tracking.purchase",
            TrackingAction::Search => "tracking.search",
            TrackingAction::Like => "tracking.like",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

/// Publishes [`TrackingEvent`]s for one session.
#[derive(Debug)]
pub struct BehaviorTracker<B> {
    bus: B,
    session_id: SessionId,
    user_id: Option<UserId>,
}

impl<B> BehaviorTracker<B>
where
    B: EventBus<TrackingEvent>,
{
    pub fn new(bus: B, session_id: SessionId) -> Self {
        Self {
            bus,
            session_id,
            user_id: None,
        }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    /// Attach (or detach, with `None`) the signed-in user.
    pub fn set_user(&mut self, user_id: Option<UserId>) {
        self.user_id = user_id;
    }

    /// Record an action. Returns whether an event was published.
    pub fn track(
        &self,
        action_type: TrackingAction,
        product_id: Option<&ProductId>,
        metadata: Map<String, Value>,
    ) -> bool {
        let Some(user_id) = self.user_id else {
            tracing::trace!(action = action_type.as_str(), "anonymous session; tracking skipped");
            return false;
        };

        let event = TrackingEvent {
            action_type,
            user_id,
            session_id: self.session_id,
            product_id: product_id.cloned(),
            metadata,
            occurred_at: Utc::now(),
        };

        match self.bus.publish(event) {
            Ok(()) => {
                tracing::debug!(action = action_type.as_str(), "tracking event recorded");
                true
            }
            Err(err) => {
                tracing::warn!(action = action_type.as_str(), error = %err, "tracking event dropped");
                false
            }
        }
    }

    pub fn track_product_view(&self, product_id: &ProductId, metadata: Map<String, Value>) -> bool {
        self.track(TrackingAction::View, Some(product_id), metadata)
    }

    pub fn track_add_to_cart(&self, product_id: &ProductId, metadata: Map<String, Value>) -> bool {
        self.track(TrackingAction::AddToCart, Some(product_id), metadata)
    }

    pub fn track_purchase(&self, product_id: &ProductId, metadata: Map<String, Value>) -> bool {
        self.track(TrackingAction::Purchase, Some(product_id), metadata)
    }

    pub fn track_like(&self, product_id: &ProductId, metadata: Map<String, Value>) -> bool {
        self.track(TrackingAction::Like, Some(product_id), metadata)
    }

    /// Search events carry the query under `"query"`; keys in `metadata` take
    /// precedence over it.
    pub fn track_search(&self, query: &str, metadata: Map<String, Value>) -> bool {
        let mut merged = Map::new();
        merged.insert("query".to_string(), Value::String(query.to_string()));
        merged.extend(metadata);
        self.track(TrackingAction::Search, None, merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::in_memory_bus::InMemoryEventBus;
    use serde_json::json;
    use std::sync::Arc;

    fn pid(raw: &str) -> ProductId {
        ProductId::parse(raw).unwrap()
    }

    fn tracker() -> BehaviorTracker<Arc<InMemoryEventBus<TrackingEvent>>> {
        BehaviorTracker::new(Arc::new(InMemoryEventBus::new()), SessionId::new())
    }

    #[test]
    fn anonymous_sessions_are_not_tracked() {
        let tracker = tracker();
        let sub = tracker.bus().subscribe();

        assert!(!tracker.track_product_view(&pid("p-1"), Map::new()));
        assert!(sub.drain().is_empty());
    }

    #[test]
    fn signed_in_sessions_publish_events() {
        let mut tracker = tracker();
        let user = UserId::new();
        tracker.set_user(Some(user));
        let sub = tracker.bus().subscribe();

        assert!(tracker.track_add_to_cart(&pid("p-1"), Map::new()));

        let events = sub.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action_type, TrackingAction::AddToCart);
        assert_eq!(events[0].user_id, user);
        assert_eq!(events[0].session_id, tracker.session_id());
        assert_eq!(events[0].product_id, Some(pid("p-1")));
        assert_eq!(events[0].event_type(), "tracking.add_to_cart");
    }

    #[test]
    fn search_merges_query_into_metadata() {
        let mut tracker = tracker();
        tracker.set_user(Some(UserId::new()));
        let sub = tracker.bus().subscribe();

        let mut metadata = Map::new();
        metadata.insert("source".to_string(), json!("shop_page"));
        tracker.track_search("moringa", metadata);

        let event = sub.recv().unwrap();
        assert_eq!(event.product_id, None);
        assert_eq!(event.metadata["query"], json!("moringa"));
        assert_eq!(event.metadata["source"], json!("shop_page"));
    }

    #[test]
    fn caller_supplied_query_wins_over_typed_query() {
        let mut tracker = tracker();
        tracker.set_user(Some(UserId::new()));
        let sub = tracker.bus().subscribe();

        let mut metadata = Map::new();
        metadata.insert("query".to_string(), json!("caller"));
        tracker.track_search("typed", metadata);

        assert_eq!(sub.recv().unwrap().metadata["query"], json!("caller"));
    }

    #[test]
    fn signing_out_stops_tracking() {
        let mut tracker = tracker();
        tracker.set_user(Some(UserId::new()));
        tracker.set_user(None);
        assert!(!tracker.track_like(&pid("p-1"), Map::new()));
    }

    #[test]
    fn action_serializes_snake_case() {
        assert_eq!(serde_json::to_value(TrackingAction::AddToCart).unwrap(), json!("add_to_cart"));
        assert_eq!(TrackingAction::AddToCart.as_str(), "add_to_cart");
    }
}
