//! Entity trait: identity + continuity.

/// Entity marker + minimal interface.
///
/// Saved configurations are entities: two saves of the same configuration are
/// still two distinct list entries.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
