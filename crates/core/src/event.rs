//! Domain event trait.

use chrono::{DateTime, Utc};

/// A fact that happened to an aggregate.
pub trait Event {
    /// Stable, dotted event name (e.g. `configurator.session.option_selected`).
    fn event_type(&self) -> &'static str;

    /// Schema version of the event payload.
    fn version(&self) -> u32;

    fn occurred_at(&self) -> DateTime<Utc>;
}
