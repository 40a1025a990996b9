//! `configurator-core`: shared building blocks for the product configurator.
//!
//! This crate contains **pure domain** primitives (identifiers, errors and the
//! aggregate/event traits). It has no knowledge of any particular product model.

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod event;
pub mod id;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use event::Event;
pub use id::{ModelId, OptionId, SavedConfigurationId, SessionId, StepId};
pub use value_object::ValueObject;
