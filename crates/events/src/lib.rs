//! Domain events, the event bus, and shopper behavior tracking.

pub mod bus;
pub mod event;
pub mod in_memory_bus;
pub mod tracking;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
pub use tracking::{BehaviorTracker, TrackingAction, TrackingEvent};
