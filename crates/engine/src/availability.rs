//! Per-step availability and invalidation of existing selections.
//!
//! An option O of step T is available when, for every other step S with a
//! selection P and every constraint declared from S to T, P's matrix entry
//! contains O. Results from several sources intersect. A constraint whose
//! matrix has no entry for P permits nothing in T.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use configurator_core::{OptionId, StepId, ValueObject};

use crate::configuration::Configuration;
use crate::constraints::{ModelConstraints, StepConstraint};
use crate::model::{ModelDefinition, Step};

/// What a step currently offers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepAvailability {
    pub available_option_ids: BTreeSet<OptionId>,
    /// The step's current selection, when it is no longer available.
    pub invalid_selected_option_ids: BTreeSet<OptionId>,
}

impl ValueObject for StepAvailability {}

impl StepAvailability {
    pub fn is_available(&self, option: &str) -> bool {
        self.available_option_ids.contains(option)
    }

    pub fn has_invalid_selection(&self) -> bool {
        !self.invalid_selected_option_ids.is_empty()
    }

    /// Narrow to `legal` and recompute the invalid flag for `selected`.
    pub fn restrict_to(&mut self, legal: &BTreeSet<OptionId>, selected: Option<&OptionId>) {
        self.available_option_ids.retain(|id| legal.contains(id));
        if let Some(selected) = selected {
            if !self.available_option_ids.contains(selected) {
                self.invalid_selected_option_ids.insert(selected.clone());
            }
        }
    }
}

pub type AvailabilityMap = BTreeMap<StepId, StepAvailability>;

/// A change the user is about to make to one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionChange {
    pub step: StepId,
    /// `None` clears the step.
    pub option: Option<OptionId>,
}

impl SelectionChange {
    pub fn select(step: impl Into<StepId>, option: impl Into<OptionId>) -> Self {
        Self {
            step: step.into(),
            option: Some(option.into()),
        }
    }

    pub fn clear(step: impl Into<StepId>) -> Self {
        Self {
            step: step.into(),
            option: None,
        }
    }

    /// `configuration` with this change applied. Unknown steps leave it unchanged.
    pub fn applied_to(&self, configuration: &Configuration) -> Configuration {
        let mut next = configuration.clone();
        match &self.option {
            Some(option) => {
                next.select(self.step.as_str(), option.clone());
            }
            None => {
                next.clear(self.step.as_str());
            }
        }
        next
    }
}

/// A selection that must be cleared by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invalidation {
    pub step: StepId,
    pub option: OptionId,
}

/// Compute availability for every step of `model`.
///
/// Pure: never mutates `configuration` and never fails. Conflicting
/// selections (e.g. loaded from a shared link) are reported through
/// `invalid_selected_option_ids`.
pub fn compute_availability(
    model: &ModelDefinition,
    constraints: &ModelConstraints,
    configuration: &Configuration,
) -> AvailabilityMap {
    let by_target = constraints.by_target();

    model
        .steps
        .iter()
        .map(|step| {
            let incoming = by_target
                .get(step.id.as_str())
                .map(Vec::as_slice)
                .unwrap_or_default();
            (step.id.clone(), step_availability(step, incoming, configuration))
        })
        .collect()
}

fn step_availability(
    step: &Step,
    incoming: &[&StepConstraint],
    configuration: &Configuration,
) -> StepAvailability {
    let mut available: BTreeSet<OptionId> = step.option_ids().cloned().collect();

    for constraint in incoming {
        if constraint.source == constraint.target {
            continue;
        }
        let Some(selected) = configuration.selected(constraint.source.as_str()) else {
            continue;
        };
        match constraint.matrix.allowed(selected.as_str()) {
            Some(permitted) => available.retain(|id| permitted.contains(id)),
            None => available.clear(),
        }
        if available.is_empty() {
            break;
        }
    }

    let invalid_selected_option_ids = configuration
        .selected(step.id.as_str())
        .filter(|selected| !available.contains(*selected))
        .cloned()
        .into_iter()
        .collect();

    StepAvailability {
        available_option_ids: available,
        invalid_selected_option_ids,
    }
}

/// Selections in steps other than `change.step` that are no longer available
/// once `change` is applied, in `step_order` order.
pub fn invalidations_after_change(
    model: &ModelDefinition,
    constraints: &ModelConstraints,
    configuration: &Configuration,
    change: &SelectionChange,
) -> Vec<Invalidation> {
    let next = change.applied_to(configuration);
    let availability = compute_availability(model, constraints, &next);
    collect_invalidations(model, &availability, Some(change.step.as_str()))
}

/// Flatten an availability map into invalidations, skipping `except`.
pub(crate) fn collect_invalidations(
    model: &ModelDefinition,
    availability: &AvailabilityMap,
    except: Option<&str>,
) -> Vec<Invalidation> {
    let invalidations: Vec<Invalidation> = model
        .ordered_steps()
        .filter(|step| Some(step.id.as_str()) != except)
        .filter_map(|step| availability.get(step.id.as_str()).map(|a| (step, a)))
        .flat_map(|(step, a)| {
            a.invalid_selected_option_ids.iter().map(|option| Invalidation {
                step: step.id.clone(),
                option: option.clone(),
            })
        })
        .collect();

    if !invalidations.is_empty() {
        tracing::debug!(
            model = %model.id,
            count = invalidations.len(),
            "selections invalidated"
        );
    }
    invalidations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::ConstraintMatrix;
    use crate::model::fixtures::lamp;

    fn ids(values: &[&str]) -> BTreeSet<OptionId> {
        values.iter().map(|v| OptionId::from(*v)).collect()
    }

    fn colour_to_size() -> ModelConstraints {
        ModelConstraints::new().with(
            "colour",
            "size",
            ConstraintMatrix::from_table(&[("r", &["s", "m"]), ("g", &["m", "l"]), ("b", &["l"])]),
        )
    }

    #[test]
    fn nothing_selected_means_everything_available() {
        let model = lamp();
        let availability =
            compute_availability(&model, &colour_to_size(), &Configuration::empty(&model));

        assert_eq!(availability.len(), 3);
        assert_eq!(availability["size"].available_option_ids, ids(&["s", "m", "l"]));
        assert_eq!(availability["colour"].available_option_ids, ids(&["r", "g", "b"]));
        assert!(availability.values().all(|a| !a.has_invalid_selection()));
    }

    #[test]
    fn empty_constraints_leave_everything_available() {
        let model = lamp();
        let config = Configuration::from_selections(&model, [("colour", "r"), ("size", "l")]);

        let availability = compute_availability(&model, &ModelConstraints::new(), &config);
        assert_eq!(availability["size"].available_option_ids, ids(&["s", "m", "l"]));
        assert!(!availability["size"].has_invalid_selection());
    }

    #[test]
    fn source_selection_narrows_target() {
        let model = lamp();
        let config = Configuration::from_selections(&model, [("colour", "g")]);

        let availability = compute_availability(&model, &colour_to_size(), &config);
        assert_eq!(availability["size"].available_option_ids, ids(&["m", "l"]));
        assert!(availability["size"].is_available("l"));
        assert!(!availability["size"].is_available("s"));
    }

    #[test]
    fn one_directional_matrix_does_not_restrict_the_reverse() {
        let model = lamp();
        let config = Configuration::from_selections(&model, [("size", "s")]);

        let availability = compute_availability(&model, &colour_to_size(), &config);
        // Only colour -> size is declared, so a size selection leaves colour open.
        assert_eq!(availability["colour"].available_option_ids, ids(&["r", "g", "b"]));
    }

    #[test]
    fn missing_matrix_entry_fails_closed() {
        let model = lamp();
        let constraints = ModelConstraints::new().with(
            "colour",
            "size",
            ConstraintMatrix::from_table(&[("r", &["s"])]),
        );
        let config = Configuration::from_selections(&model, [("colour", "b")]);

        let availability = compute_availability(&model, &constraints, &config);
        assert!(availability["size"].available_option_ids.is_empty());
        // Steps without any constraint stay open.
        assert_eq!(availability["label"].available_option_ids, ids(&["none", "exit"]));
    }

    #[test]
    fn multiple_sources_intersect() {
        let model = lamp();
        let constraints = colour_to_size().with(
            "label",
            "size",
            ConstraintMatrix::from_table(&[("none", &["s", "m", "l"]), ("exit", &["s", "l"])]),
        );
        let config = Configuration::from_selections(&model, [("colour", "g"), ("label", "exit")]);

        let availability = compute_availability(&model, &constraints, &config);
        assert_eq!(availability["size"].available_option_ids, ids(&["l"]));
    }

    #[test]
    fn conflicting_selection_is_reported_not_rejected() {
        let model = lamp();
        let config = Configuration::from_selections(&model, [("colour", "b"), ("size", "s")]);

        let availability = compute_availability(&model, &colour_to_size(), &config);
        assert_eq!(availability["size"].invalid_selected_option_ids, ids(&["s"]));
        assert!(availability["colour"].invalid_selected_option_ids.is_empty());
    }

    #[test]
    fn unknown_selected_option_is_invalid_in_its_own_step() {
        let model = lamp();
        let config = Configuration::from_selections(&model, [("colour", "purple")]);

        let availability = compute_availability(&model, &colour_to_size(), &config);
        assert_eq!(availability["colour"].invalid_selected_option_ids, ids(&["purple"]));
        // Fail-closed towards the target until the caller clears it.
        assert!(availability["size"].available_option_ids.is_empty());
    }

    #[test]
    fn change_reports_invalidated_selections_in_other_steps() {
        let model = lamp();
        let config = Configuration::from_selections(&model, [("colour", "r"), ("size", "s")]);

        let invalidations = invalidations_after_change(
            &model,
            &colour_to_size(),
            &config,
            &SelectionChange::select("colour", "b"),
        );
        assert_eq!(
            invalidations,
            vec![Invalidation {
                step: "size".into(),
                option: "s".into(),
            }]
        );
        // The caller's configuration is untouched.
        assert_eq!(config.selected("colour"), Some(&OptionId::from("r")));
    }

    #[test]
    fn change_is_evaluated_against_the_full_configuration() {
        let model = lamp();
        // label -> size and colour -> size both apply: after switching the label,
        // only the intersection with the existing colour selection survives.
        let constraints = colour_to_size().with(
            "label",
            "size",
            ConstraintMatrix::from_table(&[("none", &["s", "m", "l"]), ("exit", &["s", "l"])]),
        );
        let config = Configuration::from_selections(
            &model,
            [("colour", "g"), ("size", "m"), ("label", "none")],
        );

        let invalidations = invalidations_after_change(
            &model,
            &constraints,
            &config,
            &SelectionChange::select("label", "exit"),
        );
        assert_eq!(invalidations.len(), 1);
        assert_eq!(invalidations[0].step, "size");
        assert_eq!(invalidations[0].option, "m");
    }

    #[test]
    fn clearing_a_step_never_invalidates_anything() {
        let model = lamp();
        let config = Configuration::from_selections(&model, [("colour", "r"), ("size", "s")]);

        let invalidations = invalidations_after_change(
            &model,
            &colour_to_size(),
            &config,
            &SelectionChange::clear("colour"),
        );
        assert!(invalidations.is_empty());
    }

    #[test]
    fn restrict_to_flags_a_selection_outside_the_legal_set() {
        let mut availability = StepAvailability {
            available_option_ids: ids(&["s", "m", "l"]),
            invalid_selected_option_ids: BTreeSet::new(),
        };
        let selected = OptionId::from("s");

        availability.restrict_to(&ids(&["m", "l"]), Some(&selected));
        assert_eq!(availability.available_option_ids, ids(&["m", "l"]));
        assert_eq!(availability.invalid_selected_option_ids, ids(&["s"]));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn three_way_constraints() -> ModelConstraints {
            colour_to_size()
                .with(
                    "label",
                    "size",
                    ConstraintMatrix::from_table(&[
                        ("none", &["s", "m", "l"]),
                        ("exit", &["s", "l"]),
                    ]),
                )
                .with(
                    "size",
                    "label",
                    ConstraintMatrix::from_table(&[("s", &["none", "exit"]), ("m", &["none"])]),
                )
                .with(
                    "colour",
                    "label",
                    ConstraintMatrix::from_table(&[
                        ("r", &["exit"]),
                        ("g", &["none", "exit"]),
                        ("b", &["none"]),
                    ]),
                )
        }

        fn selection(
            options: &'static [&'static str],
        ) -> impl Strategy<Value = Option<&'static str>> {
            prop::option::of(prop::sample::select(options))
        }

        fn configuration(
            colour: Option<&str>,
            size: Option<&str>,
            label: Option<&str>,
        ) -> Configuration {
            let model = lamp();
            let mut config = Configuration::empty(&model);
            for (step, option) in [("colour", colour), ("size", size), ("label", label)] {
                if let Some(option) = option {
                    config.select(step, option);
                }
            }
            config
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: same inputs, same availability.
            #[test]
            fn availability_is_idempotent(
                colour in selection(&["r", "g", "b"]),
                size in selection(&["s", "m", "l"]),
                label in selection(&["none", "exit"]),
            ) {
                let model = lamp();
                let constraints = three_way_constraints();
                let config = configuration(colour, size, label);

                let first = compute_availability(&model, &constraints, &config);
                let second = compute_availability(&model, &constraints, &config);
                prop_assert_eq!(first, second);
            }

            /// Property: clearing a constraining selection never shrinks any
            /// other step's available set.
            #[test]
            fn removing_a_selection_only_grows_availability(
                colour in selection(&["r", "g", "b"]),
                size in selection(&["s", "m", "l"]),
                label in selection(&["none", "exit"]),
                removed in prop::sample::select(&["colour", "size", "label"][..]),
            ) {
                let model = lamp();
                let constraints = three_way_constraints();
                let config = configuration(colour, size, label);
                let mut reduced = config.clone();
                reduced.clear(removed);

                let before = compute_availability(&model, &constraints, &config);
                let after = compute_availability(&model, &constraints, &reduced);
                for step in ["colour", "size", "label"] {
                    if step == removed {
                        continue;
                    }
                    prop_assert!(before[step]
                        .available_option_ids
                        .is_subset(&after[step].available_option_ids));
                }
            }

            /// Property: an option is available iff every selected source permits it.
            #[test]
            fn availability_is_the_intersection_of_sources(
                colour in selection(&["r", "g", "b"]),
                label in selection(&["none", "exit"]),
            ) {
                let model = lamp();
                let constraints = three_way_constraints();
                let config = configuration(colour, None, label);

                let availability = compute_availability(&model, &constraints, &config);
                for size in ["s", "m", "l"] {
                    let expected = constraints
                        .by_target()
                        .get("size")
                        .into_iter()
                        .flatten()
                        .all(|c| match config.selected(c.source.as_str()) {
                            Some(p) => c.matrix.permits(p.as_str(), size),
                            None => true,
                        });
                    prop_assert_eq!(availability["size"].is_available(size), expected);
                }
            }
        }
    }
}
