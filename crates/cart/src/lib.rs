//! Session cart (in-memory, single writer).
//!
//! The cart owns product snapshots and quantities for one session. It performs
//! no IO and never fails: degenerate inputs are handled by policy (removal on
//! non-positive quantity, no-op on unknown ids).

pub mod cart;

pub use cart::{Cart, CartLine};
