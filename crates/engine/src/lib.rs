//! Constraint propagation engine for stepwise product configuration.
//!
//! Everything here is deterministic, in-memory domain logic (no IO). Model data
//! is supplied by the caller, usually from `configurator-catalog`.

pub mod allow_list;
pub mod availability;
pub mod builder;
pub mod configuration;
pub mod constraints;
pub mod model;
pub mod registry;

pub use allow_list::{AllowList, CodeLayout, CodeValidation};
pub use availability::{
    AvailabilityMap, Invalidation, SelectionChange, StepAvailability, compute_availability,
    invalidations_after_change,
};
pub use builder::{ProductModel, build};
pub use configuration::Configuration;
pub use constraints::{ConstraintMatrix, ModelConstraints, StepConstraint};
pub use model::{
    ModelDefinition, ProductModelSchema, SeparatorMode, SeparatorPolicy, Step, StepOption,
};
pub use registry::{ModelEntry, ModelRegistry};
