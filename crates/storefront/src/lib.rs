//! Storefront session layer.
//!
//! Wires the catalog, cart, checkout and tracking crates into one explicitly
//! owned [`Session`] per app run, plus environment-driven configuration.

pub mod config;
pub mod session;

pub use config::{ConfigError, StorefrontConfig};
pub use session::{Session, SessionSummary, TrackingBus};
