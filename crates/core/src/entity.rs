//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Catalog products are entities: two snapshots with the same id describe the
/// same product even if their price or stock flag differ.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
