//! The user's current selections for one model.

use std::collections::BTreeMap;

use serde::Serialize;

use configurator_core::{OptionId, StepId, ValueObject};

use crate::model::ModelDefinition;

/// One selected option (or none) per step of a model.
///
/// Keys are exactly the model's steps: selecting a step the model does not
/// declare has no effect. The configuration never fills itself in.
///
/// Serializes as a plain `step -> option | null` map. There is no
/// `Deserialize`: stored maps come back through [`Configuration::conform`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Configuration {
    selections: BTreeMap<StepId, Option<OptionId>>,
}

impl ValueObject for Configuration {}

impl Configuration {
    /// Every step of `model` present and unselected.
    pub fn empty(model: &ModelDefinition) -> Self {
        Self {
            selections: model.steps.iter().map(|s| (s.id.clone(), None)).collect(),
        }
    }

    /// Build from untrusted `(step, option)` pairs (e.g. a shared link).
    ///
    /// Pairs naming steps outside the model are dropped. Option ids are kept
    /// as given even if the step does not declare them; the engine reports
    /// those as invalid selections rather than failing here.
    pub fn from_selections<I, S, O>(model: &ModelDefinition, selections: I) -> Self
    where
        I: IntoIterator<Item = (S, O)>,
        S: AsRef<str>,
        O: Into<OptionId>,
    {
        let mut config = Self::empty(model);
        for (step, option) in selections {
            if !config.select(step.as_ref(), option) {
                tracing::debug!(
                    model = %model.id,
                    step = step.as_ref(),
                    "ignoring selection for unknown step"
                );
            }
        }
        config
    }

    /// Fit a stored `step -> option | null` map to `model`.
    ///
    /// Steps the model does not declare are dropped; steps missing from the
    /// map come back unselected.
    pub fn conform(
        model: &ModelDefinition,
        selections: BTreeMap<StepId, Option<OptionId>>,
    ) -> Self {
        let mut config = Self::empty(model);
        for (step, option) in selections {
            match config.selections.get_mut(step.as_str()) {
                Some(slot) => *slot = option,
                None => tracing::debug!(
                    model = %model.id,
                    step = %step,
                    "dropping stored selection for unknown step"
                ),
            }
        }
        config
    }

    /// Select `option` for `step`. Returns `false` (and changes nothing) when
    /// the step is not part of this configuration.
    pub fn select(&mut self, step: &str, option: impl Into<OptionId>) -> bool {
        match self.selections.get_mut(step) {
            Some(slot) => {
                *slot = Some(option.into());
                true
            }
            None => false,
        }
    }

    /// Clear `step`, returning the option that was selected.
    pub fn clear(&mut self, step: &str) -> Option<OptionId> {
        self.selections.get_mut(step).and_then(Option::take)
    }

    /// Clear every step.
    pub fn reset(&mut self) {
        for slot in self.selections.values_mut() {
            *slot = None;
        }
    }

    pub fn selected(&self, step: &str) -> Option<&OptionId> {
        self.selections.get(step).and_then(Option::as_ref)
    }

    pub fn is_selected(&self, step: &str) -> bool {
        self.selected(step).is_some()
    }

    pub fn contains_step(&self, step: &str) -> bool {
        self.selections.contains_key(step)
    }

    /// Filled steps with their selected option, in step-id order.
    pub fn iter_selected(&self) -> impl Iterator<Item = (&StepId, &OptionId)> {
        self.selections
            .iter()
            .filter_map(|(step, option)| option.as_ref().map(|o| (step, o)))
    }

    pub fn selected_count(&self) -> usize {
        self.iter_selected().count()
    }

    pub fn steps(&self) -> impl Iterator<Item = &StepId> {
        self.selections.keys()
    }

    /// Every step with its slot, for storage.
    pub fn selections(&self) -> &BTreeMap<StepId, Option<OptionId>> {
        &self.selections
    }
}
