//! Lookup of everything the engine knows about a model, keyed by model id.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use configurator_core::{DomainError, DomainResult, ModelId, OptionId};

use crate::allow_list::{AllowList, CodeValidation};
use crate::availability::{
    AvailabilityMap, Invalidation, SelectionChange, collect_invalidations, compute_availability,
};
use crate::builder::{ProductModel, build};
use crate::configuration::Configuration;
use crate::constraints::ModelConstraints;
use crate::model::ModelDefinition;

/// A model definition together with its constraints and optional allow-list.
#[derive(Debug, Clone)]
pub struct ModelEntry {
    definition: ModelDefinition,
    constraints: ModelConstraints,
    allow_list: Option<AllowList>,
}

impl ModelEntry {
    /// Combine a definition with its declared matrices. `available_for`
    /// declarations are lowered and appended automatically.
    pub fn new(definition: ModelDefinition, constraints: ModelConstraints) -> Self {
        let mut constraints = constraints;
        constraints.extend(ModelConstraints::from_available_for(&definition));
        Self {
            definition,
            constraints,
            allow_list: None,
        }
    }

    pub fn with_allow_list(mut self, allow_list: AllowList) -> Self {
        self.allow_list = Some(allow_list);
        self
    }

    pub fn definition(&self) -> &ModelDefinition {
        &self.definition
    }

    pub fn constraints(&self) -> &ModelConstraints {
        &self.constraints
    }

    pub fn allow_list(&self) -> Option<&AllowList> {
        self.allow_list.as_ref()
    }

    pub fn id(&self) -> &ModelId {
        &self.definition.id
    }

    /// Static consistency checks for the definition, its matrices and its
    /// allow-list.
    pub fn validate(&self) -> DomainResult<()> {
        self.definition.validate()?;
        self.constraints.validate_against(&self.definition)?;
        if let Some(list) = &self.allow_list {
            if list.model_id() != self.id() {
                return Err(DomainError::invariant(format!(
                    "model {}: allow-list belongs to model {}",
                    self.id(),
                    list.model_id()
                )));
            }
        }
        Ok(())
    }

    /// Availability for every step.
    ///
    /// For allow-list models the matrix result is further narrowed to the
    /// values that still occur in an approved code.
    pub fn availability(&self, configuration: &Configuration) -> AvailabilityMap {
        let mut availability =
            compute_availability(&self.definition, &self.constraints, configuration);

        if let Some(list) = &self.allow_list {
            for axis in list.layout().axes() {
                let Some(step) = availability.get_mut(axis.as_str()) else {
                    continue;
                };
                let legal = list
                    .derive_legal_options(axis.as_str(), configuration)
                    .into_iter()
                    .collect();
                step.restrict_to(&legal, configuration.selected(axis.as_str()));
            }
        }
        availability
    }

    /// Options of `step` currently selectable, in declaration order.
    pub fn available_options(&self, configuration: &Configuration, step: &str) -> Vec<OptionId> {
        let availability = self.availability(configuration);
        let (Some(definition), Some(available)) =
            (self.definition.step(step), availability.get(step))
        else {
            return Vec::new();
        };
        definition
            .option_ids()
            .filter(|id| available.is_available(id.as_str()))
            .cloned()
            .collect()
    }

    /// Selections in other steps that `change` would invalidate.
    pub fn invalidations_after_change(
        &self,
        configuration: &Configuration,
        change: &SelectionChange,
    ) -> Vec<Invalidation> {
        let next = change.applied_to(configuration);
        let availability = self.availability(&next);
        collect_invalidations(&self.definition, &availability, Some(change.step.as_str()))
    }

    /// Selections in other steps whose matrices exclude `option` of `step`,
    /// in `step_order` order.
    ///
    /// One-directional matrices restrict only their target, so a selection
    /// can block `option` without ever being reported as invalid itself.
    pub fn blocking_selections(
        &self,
        configuration: &Configuration,
        step: &str,
        option: &str,
    ) -> Vec<Invalidation> {
        let blocking: BTreeSet<&str> = self
            .constraints
            .iter()
            .filter(|c| c.target == step && c.source != step)
            .filter(|c| {
                configuration
                    .selected(c.source.as_str())
                    .is_some_and(|selected| !c.matrix.permits(selected.as_str(), option))
            })
            .map(|c| c.source.as_str())
            .collect();

        self.definition
            .ordered_steps()
            .filter(|s| blocking.contains(s.id.as_str()))
            .filter_map(|s| {
                configuration.selected(s.id.as_str()).map(|selected| Invalidation {
                    step: s.id.clone(),
                    option: selected.clone(),
                })
            })
            .collect()
    }

    /// Every selection that is currently invalid (e.g. after loading a shared link).
    pub fn invalid_selections(&self, configuration: &Configuration) -> Vec<Invalidation> {
        let availability = self.availability(configuration);
        collect_invalidations(&self.definition, &availability, None)
    }

    pub fn build(&self, configuration: &Configuration) -> ProductModel {
        build(configuration, &self.definition)
    }

    /// Allow-list membership for allow-list models; completeness for the rest.
    pub fn validate_configuration(&self, configuration: &Configuration) -> CodeValidation {
        if let Some(list) = &self.allow_list {
            return list.validate(configuration);
        }

        let product = self.build(configuration);
        if !product.is_complete {
            let missing: Vec<&str> = product.missing_steps.iter().map(|s| s.as_str()).collect();
            return CodeValidation::Invalid {
                reason: format!("incomplete selection, missing: {}", missing.join(", ")),
            };
        }
        if let Some(invalid) = self.invalid_selections(configuration).first() {
            return CodeValidation::Invalid {
                reason: format!(
                    "{}: option `{}` of step `{}` is not compatible with the other selections",
                    product.full_code, invalid.option, invalid.step
                ),
            };
        }
        CodeValidation::Valid {
            code: product.full_code,
        }
    }

    pub fn empty_configuration(&self) -> Configuration {
        Configuration::empty(&self.definition)
    }
}

/// Registry of all known models.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    entries: BTreeMap<ModelId, Arc<ModelEntry>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and add `entry`. Duplicate ids or slugs are conflicts.
    pub fn register(&mut self, entry: ModelEntry) -> DomainResult<()> {
        entry.validate()?;

        if self.entries.contains_key(entry.id()) {
            return Err(DomainError::conflict(format!(
                "model {} is already registered",
                entry.id()
            )));
        }
        if self.by_slug(&entry.definition().slug).is_some() {
            return Err(DomainError::conflict(format!(
                "slug `{}` is already registered",
                entry.definition().slug
            )));
        }

        tracing::debug!(
            model = %entry.id(),
            steps = entry.definition().steps.len(),
            constraints = entry.constraints().len(),
            approved_codes = entry.allow_list().map_or(0, AllowList::len),
            "model registered"
        );
        self.entries.insert(entry.id().clone(), Arc::new(entry));
        Ok(())
    }

    /// Look up by model id. Unknown ids resolve to `None`.
    pub fn get(&self, id: &str) -> Option<Arc<ModelEntry>> {
        self.entries.get(id).cloned()
    }

    pub fn by_slug(&self, slug: &str) -> Option<Arc<ModelEntry>> {
        self.entries
            .values()
            .find(|entry| entry.definition().slug == slug)
            .cloned()
    }

    /// Look up by id, falling back to slug.
    pub fn resolve(&self, id_or_slug: &str) -> Option<Arc<ModelEntry>> {
        self.get(id_or_slug).or_else(|| self.by_slug(id_or_slug))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ModelEntry>> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allow_list::CodeLayout;
    use crate::constraints::ConstraintMatrix;
    use crate::model::fixtures::lamp;
    use crate::model::{SeparatorMode, StepOption};

    fn lamp_entry() -> ModelEntry {
        ModelEntry::new(
            lamp(),
            ModelConstraints::new().with(
                "colour",
                "size",
                ConstraintMatrix::from_table(&[
                    ("r", &["s", "m"]),
                    ("g", &["m", "l"]),
                    ("b", &["l"]),
                ]),
            ),
        )
    }

    fn coded_lamp_entry() -> ModelEntry {
        let mut model = lamp();
        model.id = ModelId::from("LMPX");
        model.slug = "coded-lamp".to_string();
        model.steps[2].options[0].code = "NL".to_string();
        let layout = CodeLayout::new(
            "LMP",
            &[
                ("colour", SeparatorMode::None),
                ("size", SeparatorMode::None),
                ("label", SeparatorMode::Dash),
            ],
            r"^LMP(?P<colour>[RGB])(?P<size>[123])-(?P<label>[A-Z]{2})$",
        )
        .unwrap();
        let list = AllowList::new(
            &model,
            layout,
            &["LMPR1-NL", "LMPR2-EX", "LMPG1-EX", "LMPG2-NL"],
        )
        .unwrap();
        let constraints = list.derive_constraints();
        ModelEntry::new(model, constraints).with_allow_list(list)
    }

    #[test]
    fn register_and_resolve() {
        let mut registry = ModelRegistry::new();
        registry.register(lamp_entry()).unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.get("LMP").is_some());
        assert!(registry.resolve("test-lamp").is_some());
        assert!(registry.get("nope").is_none());
        assert!(registry.resolve("nope").is_none());
    }

    #[test]
    fn duplicate_registration_is_a_conflict() {
        let mut registry = ModelRegistry::new();
        registry.register(lamp_entry()).unwrap();

        assert!(matches!(
            registry.register(lamp_entry()),
            Err(DomainError::Conflict(_))
        ));
    }

    #[test]
    fn invalid_entries_are_rejected() {
        let mut model = lamp();
        model.step_order.push("finish".into());

        let mut registry = ModelRegistry::new();
        let err = registry
            .register(ModelEntry::new(model, ModelConstraints::new()))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn available_for_declarations_take_part_in_availability() {
        let mut model = lamp();
        model.steps[2].available_for_step = Some("colour".into());
        model.steps[2].options[1] = StepOption::new("exit", "EXIT", "EX").available_for(&["g"]);
        let entry = ModelEntry::new(model, ModelConstraints::new());

        let red = Configuration::from_selections(entry.definition(), [("colour", "r")]);
        assert_eq!(entry.available_options(&red, "label"), vec![OptionId::from("none")]);

        let green = Configuration::from_selections(entry.definition(), [("colour", "g")]);
        assert_eq!(
            entry.available_options(&green, "label"),
            vec![OptionId::from("none"), OptionId::from("exit")]
        );
    }

    #[test]
    fn allow_list_narrows_matrix_availability() {
        let entry = coded_lamp_entry();
        // Pairwise, red and exit both permit sizes {s, m}; the only red + exit
        // code is LMPR2-EX.
        let config = Configuration::from_selections(
            entry.definition(),
            [("colour", "r"), ("label", "exit")],
        );
        assert_eq!(entry.available_options(&config, "size"), vec![OptionId::from("m")]);

        let matrix_only =
            compute_availability(entry.definition(), entry.constraints(), &config);
        assert!(matrix_only["size"].is_available("s"));
        assert!(matrix_only["size"].is_available("m"));
    }

    #[test]
    fn allow_list_models_validate_by_membership() {
        let entry = coded_lamp_entry();
        let listed = Configuration::from_selections(
            entry.definition(),
            [("colour", "g"), ("size", "m"), ("label", "none")],
        );
        assert_eq!(
            entry.validate_configuration(&listed),
            CodeValidation::Valid {
                code: "LMPG2-NL".to_string()
            }
        );
        assert_eq!(entry.build(&listed).full_code, "LMPG2-NL");

        let unlisted = Configuration::from_selections(
            entry.definition(),
            [("colour", "g"), ("size", "m"), ("label", "exit")],
        );
        assert!(!entry.validate_configuration(&unlisted).is_valid());
    }

    #[test]
    fn matrix_models_validate_by_completeness_and_compatibility() {
        let entry = lamp_entry();

        let incomplete = Configuration::from_selections(entry.definition(), [("colour", "r")]);
        let result = entry.validate_configuration(&incomplete);
        assert!(result.reason().unwrap().contains("size"));

        let conflicting = Configuration::from_selections(
            entry.definition(),
            [("colour", "b"), ("size", "s")],
        );
        let result = entry.validate_configuration(&conflicting);
        assert!(result.reason().unwrap().contains("`s`"));

        let ok =
            Configuration::from_selections(entry.definition(), [("colour", "b"), ("size", "l")]);
        assert_eq!(
            entry.validate_configuration(&ok),
            CodeValidation::Valid {
                code: "LMPB3".to_string()
            }
        );
    }

    #[test]
    fn blocking_selections_follow_one_directional_matrices() {
        // colour -> size only; nothing constrains colour.
        let entry = lamp_entry();
        let config = Configuration::from_selections(entry.definition(), [("colour", "b")]);

        let blocking = entry.blocking_selections(&config, "size", "s");
        assert_eq!(
            blocking,
            vec![Invalidation {
                step: "colour".into(),
                option: "b".into(),
            }]
        );
        assert!(entry.blocking_selections(&config, "size", "l").is_empty());
        assert!(entry.blocking_selections(&config, "colour", "r").is_empty());
    }

    #[test]
    fn invalid_selections_cover_every_step() {
        let entry = lamp_entry();
        let config = Configuration::from_selections(
            entry.definition(),
            [("colour", "purple"), ("size", "s")],
        );

        let invalid = entry.invalid_selections(&config);
        let steps: Vec<&str> = invalid.iter().map(|i| i.step.as_str()).collect();
        assert_eq!(steps, vec!["colour", "size"]);
    }
}
