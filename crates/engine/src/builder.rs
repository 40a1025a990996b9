//! Render a configuration into a product code.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use configurator_core::{StepId, ValueObject};

use crate::configuration::Configuration;
use crate::model::ModelDefinition;

/// Derived view of a configuration. Recomputed on every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductModel {
    pub base_code: String,
    /// Code fragment per step of `parts_order` (empty when unselected).
    pub parts: BTreeMap<StepId, String>,
    pub full_code: String,
    pub is_complete: bool,
    /// Unselected required steps, in `step_order` order.
    pub missing_steps: Vec<StepId>,
}

impl ValueObject for ProductModel {}

/// Build the product model for `configuration`.
///
/// Unselected steps and unknown option ids contribute an empty fragment.
/// Separators are only emitted in front of non-empty fragments.
pub fn build(configuration: &Configuration, model: &ModelDefinition) -> ProductModel {
    let schema = &model.schema;
    let mut parts = BTreeMap::new();
    let mut full_code = schema.base_code.clone();

    for step in &schema.parts_order {
        let code = configuration
            .selected(step.as_str())
            .and_then(|option| model.option(step.as_str(), option.as_str()))
            .map(|option| option.code.as_str())
            .unwrap_or("");

        if !code.is_empty() {
            full_code.push_str(schema.separators.separator(step.as_str()));
            full_code.push_str(code);
        }
        parts.insert(step.clone(), code.to_string());
    }

    let missing_steps: Vec<StepId> = model
        .ordered_steps()
        .filter(|step| step.required && !configuration.is_selected(step.id.as_str()))
        .map(|step| step.id.clone())
        .collect();

    ProductModel {
        base_code: schema.base_code.clone(),
        parts,
        full_code,
        is_complete: missing_steps.is_empty(),
        missing_steps,
    }
}
