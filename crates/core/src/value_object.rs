//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: two `Money`
/// amounts of 2000 francs are interchangeable, whereas two products with the
/// same price are not.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
