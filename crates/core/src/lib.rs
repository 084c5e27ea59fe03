//! `phytoshop-core`: storefront domain building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the domain error model, money, and the aggregate/entity traits
//! shared by the catalog, cart and order crates.

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{AggregateId, ProductId, SessionId, UserId};
pub use money::Money;
pub use value_object::ValueObject;
