//! Checkout and order tracking (event-sourced).
//!
//! Business rules for turning a session cart into an order and moving that
//! order through delivery, implemented purely as deterministic domain logic
//! (no IO, no HTTP, no storage).

pub mod checkout;
pub mod order;

pub use checkout::{
    CheckoutRequest, CheckoutSummary, CustomerInfo, DEFAULT_CITY, DEFAULT_DELIVERY_FEE, checkout,
};
pub use order::{
    CancelOrder, ConfirmOrder, DeliverOrder, Order, OrderCancelled, OrderCommand, OrderConfirmed,
    OrderDelivered, OrderEvent, OrderId, OrderLine, OrderPlaced, OrderShipped, OrderStatus,
    PaymentMethod, PlaceOrder, PreparationStarted, ShipOrder, StartPreparing,
};
