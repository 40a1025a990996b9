//! Static model definitions: steps, options and the product code schema.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use configurator_core::{DomainError, DomainResult, ModelId, OptionId, StepId};

/// One selectable value within a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOption {
    pub id: OptionId,
    pub label: String,
    /// Fragment contributed to the product code. May be empty.
    pub code: String,
    /// Option ids of the step's `available_for_step` that legitimize this option.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_for: Option<Vec<OptionId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl StepOption {
    pub fn new(id: impl Into<OptionId>, label: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            code: code.into(),
            available_for: None,
            notes: None,
        }
    }

    pub fn available_for(mut self, ids: &[&str]) -> Self {
        self.available_for = Some(ids.iter().map(|id| OptionId::from(*id)).collect());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// An ordered configuration dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,
    pub title: String,
    pub required: bool,
    pub options: Vec<StepOption>,
    /// The step that `StepOption::available_for` lists refer to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_for_step: Option<StepId>,
}

impl Step {
    pub fn required(
        id: impl Into<StepId>,
        title: impl Into<String>,
        options: Vec<StepOption>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            required: true,
            options,
            available_for_step: None,
        }
    }

    pub fn optional(
        id: impl Into<StepId>,
        title: impl Into<String>,
        options: Vec<StepOption>,
    ) -> Self {
        Self {
            required: false,
            ..Self::required(id, title, options)
        }
    }

    pub fn paired_with(mut self, step: impl Into<StepId>) -> Self {
        self.available_for_step = Some(step.into());
        self
    }

    pub fn option(&self, id: &str) -> Option<&StepOption> {
        self.options.iter().find(|o| o.id == id)
    }

    pub fn option_ids(&self) -> impl Iterator<Item = &OptionId> {
        self.options.iter().map(|o| &o.id)
    }
}

/// Separator placed before a code part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeparatorMode {
    None,
    Dash,
}

impl SeparatorMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SeparatorMode::None => "",
            SeparatorMode::Dash => "-",
        }
    }
}

/// Model-wide separator mode with optional per-step overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeparatorPolicy {
    pub mode: SeparatorMode,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<StepId, SeparatorMode>,
}

impl SeparatorPolicy {
    pub fn uniform(mode: SeparatorMode) -> Self {
        Self {
            mode,
            overrides: BTreeMap::new(),
        }
    }

    pub fn with_override(mut self, step: impl Into<StepId>, mode: SeparatorMode) -> Self {
        self.overrides.insert(step.into(), mode);
        self
    }

    pub fn separator(&self, step: &str) -> &'static str {
        self.overrides.get(step).copied().unwrap_or(self.mode).as_str()
    }
}

/// How a configuration is rendered into a product code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductModelSchema {
    pub base_code: String,
    pub parts_order: Vec<StepId>,
    pub separators: SeparatorPolicy,
}

/// A configurable product model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDefinition {
    pub id: ModelId,
    pub name: String,
    pub slug: String,
    pub steps: Vec<Step>,
    pub step_order: Vec<StepId>,
    pub schema: ProductModelSchema,
    /// Step whose value narrows the most downstream options. Informational.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_dependency_step: Option<StepId>,
}

impl ModelDefinition {
    pub fn step(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    pub fn has_step(&self, id: &str) -> bool {
        self.step(id).is_some()
    }

    pub fn option(&self, step: &str, option: &str) -> Option<&StepOption> {
        self.step(step).and_then(|s| s.option(option))
    }

    /// Steps in `step_order`. Ids with no matching step are skipped.
    pub fn ordered_steps(&self) -> impl Iterator<Item = &Step> {
        self.step_order.iter().filter_map(|id| self.step(id.as_str()))
    }

    /// Check the definition for static data errors.
    pub fn validate(&self) -> DomainResult<()> {
        if self.id.as_str().trim().is_empty() {
            return Err(DomainError::invariant("model id cannot be empty"));
        }

        let mut step_ids = BTreeSet::new();
        for step in &self.steps {
            if !step_ids.insert(step.id.as_str()) {
                return Err(DomainError::invariant(format!(
                    "model {}: step `{}` declared twice",
                    self.id, step.id
                )));
            }

            let mut option_ids = BTreeSet::new();
            for option in &step.options {
                if !option_ids.insert(option.id.as_str()) {
                    return Err(DomainError::invariant(format!(
                        "model {}: option `{}` declared twice in step `{}`",
                        self.id, option.id, step.id
                    )));
                }
            }

            self.validate_available_for(step)?;
        }

        let mut ordered = BTreeSet::new();
        for id in &self.step_order {
            if !step_ids.contains(id.as_str()) {
                return Err(DomainError::invariant(format!(
                    "model {}: step order references unknown step `{id}`",
                    self.id
                )));
            }
            if !ordered.insert(id.as_str()) {
                return Err(DomainError::invariant(format!(
                    "model {}: step `{id}` appears twice in step order",
                    self.id
                )));
            }
        }
        if ordered.len() != step_ids.len() {
            return Err(DomainError::invariant(format!(
                "model {}: step order does not list every step",
                self.id
            )));
        }

        for id in &self.schema.parts_order {
            if !step_ids.contains(id.as_str()) {
                return Err(DomainError::invariant(format!(
                    "model {}: parts order references unknown step `{id}`",
                    self.id
                )));
            }
        }
        for id in self.schema.separators.overrides.keys() {
            if !step_ids.contains(id.as_str()) {
                return Err(DomainError::invariant(format!(
                    "model {}: separator override for unknown step `{id}`",
                    self.id
                )));
            }
        }

        if let Some(primary) = &self.primary_dependency_step {
            if !step_ids.contains(primary.as_str()) {
                return Err(DomainError::invariant(format!(
                    "model {}: primary dependency step `{primary}` is not declared",
                    self.id
                )));
            }
        }

        Ok(())
    }

    fn validate_available_for(&self, step: &Step) -> DomainResult<()> {
        let uses_available_for = step.options.iter().any(|o| o.available_for.is_some());
        let Some(paired_id) = &step.available_for_step else {
            if uses_available_for {
                return Err(DomainError::invariant(format!(
                    "model {}: step `{}` uses available_for without a paired step",
                    self.id, step.id
                )));
            }
            return Ok(());
        };

        if *paired_id == step.id {
            return Err(DomainError::invariant(format!(
                "model {}: step `{}` cannot be paired with itself",
                self.id, step.id
            )));
        }
        let paired = self.step(paired_id.as_str()).ok_or_else(|| {
            DomainError::invariant(format!(
                "model {}: step `{}` is paired with unknown step `{paired_id}`",
                self.id, step.id
            ))
        })?;

        for option in &step.options {
            for id in option.available_for.iter().flatten() {
                if paired.option(id.as_str()).is_none() {
                    return Err(DomainError::invariant(format!(
                        "model {}: option `{}` of `{}` is available for unknown `{paired_id}` option `{id}`",
                        self.id, option.id, step.id
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Small three-step model used by unit tests across the engine.
    pub fn lamp() -> ModelDefinition {
        ModelDefinition {
            id: ModelId::from("LMP"),
            name: "Test lamp".to_string(),
            slug: "test-lamp".to_string(),
            steps: vec![
                Step::required(
                    "colour",
                    "Colour",
                    vec![
                        StepOption::new("r", "Red", "R"),
                        StepOption::new("g", "Green", "G"),
                        StepOption::new("b", "Blue", "B"),
                    ],
                ),
                Step::required(
                    "size",
                    "Size",
                    vec![
                        StepOption::new("s", "Small", "1"),
                        StepOption::new("m", "Medium", "2"),
                        StepOption::new("l", "Large", "3"),
                    ],
                ),
                Step::optional(
                    "label",
                    "Label",
                    vec![
                        StepOption::new("none", "No label", ""),
                        StepOption::new("exit", "EXIT", "EX"),
                    ],
                ),
            ],
            step_order: vec!["colour".into(), "size".into(), "label".into()],
            schema: ProductModelSchema {
                base_code: "LMP".to_string(),
                parts_order: vec!["colour".into(), "size".into(), "label".into()],
                separators: SeparatorPolicy::uniform(SeparatorMode::None)
                    .with_override("label", SeparatorMode::Dash),
            },
            primary_dependency_step: Some("colour".into()),
        }
    }
}
