//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Configurations, product models and availability results are value objects:
/// they have no identity and are recomputed rather than updated. Two
/// configurations selecting the same options for the same steps are equal.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
