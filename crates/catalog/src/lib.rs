//! Product catalog: model definitions and constraint tables.
//!
//! Each module declares one product family. `default_registry()` validates
//! and registers all of them.

pub mod global_reset;
pub mod stopper_station;
pub mod universal_stopper;

use configurator_core::DomainResult;
use configurator_engine::ModelRegistry;

/// Registry containing every catalog model.
pub fn default_registry() -> DomainResult<ModelRegistry> {
    let mut registry = ModelRegistry::new();
    registry.register(stopper_station::entry())?;
    registry.register(global_reset::entry()?)?;
    registry.register(universal_stopper::entry())?;

    tracing::info!(models = registry.len(), "catalog loaded");
    Ok(registry)
}
