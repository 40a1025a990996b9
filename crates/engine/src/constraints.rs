//! Directional pairwise compatibility tables between steps.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use configurator_core::{DomainError, DomainResult, OptionId, StepId};

use crate::model::ModelDefinition;

/// Source option id → target option ids it permits, for one (source, target)
/// step pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConstraintMatrix {
    entries: BTreeMap<OptionId, BTreeSet<OptionId>>,
}

impl ConstraintMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a static table, the shape catalog data is declared in.
    pub fn from_table(table: &[(&str, &[&str])]) -> Self {
        let mut matrix = Self::new();
        for (source, targets) in table {
            matrix.permit(*source, targets.iter().copied());
        }
        matrix
    }

    /// Add `targets` to the set permitted by `source`.
    pub fn permit<I, T>(&mut self, source: impl Into<OptionId>, targets: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<OptionId>,
    {
        self.entries
            .entry(source.into())
            .or_default()
            .extend(targets.into_iter().map(Into::into));
    }

    /// Target options permitted by `source`, or `None` when the matrix has no
    /// entry for it.
    pub fn allowed(&self, source: &str) -> Option<&BTreeSet<OptionId>> {
        self.entries.get(source)
    }

    /// Whether `source` permits `target`. A missing entry permits nothing.
    pub fn permits(&self, source: &str, target: &str) -> bool {
        self.allowed(source).is_some_and(|set| set.contains(target))
    }

    pub fn entries(&self) -> impl Iterator<Item = (&OptionId, &BTreeSet<OptionId>)> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One declared direction: selections in `source` restrict `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepConstraint {
    pub source: StepId,
    pub target: StepId,
    pub matrix: ConstraintMatrix,
}

/// Every directional constraint declared for one model.
///
/// The reverse of a declared direction is never inferred.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelConstraints {
    constraints: Vec<StepConstraint>,
}

impl ModelConstraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        mut self,
        source: impl Into<StepId>,
        target: impl Into<StepId>,
        matrix: ConstraintMatrix,
    ) -> Self {
        self.push(source, target, matrix);
        self
    }

    pub fn push(
        &mut self,
        source: impl Into<StepId>,
        target: impl Into<StepId>,
        matrix: ConstraintMatrix,
    ) {
        self.constraints.push(StepConstraint {
            source: source.into(),
            target: target.into(),
            matrix,
        });
    }

    pub fn extend(&mut self, other: ModelConstraints) {
        self.constraints.extend(other.constraints);
    }

    pub fn iter(&self) -> impl Iterator<Item = &StepConstraint> {
        self.constraints.iter()
    }

    /// Constraints declared from `source` to `target` (there may be several).
    pub fn between<'a>(
        &'a self,
        source: &'a str,
        target: &'a str,
    ) -> impl Iterator<Item = &'a StepConstraint> + 'a {
        self.constraints
            .iter()
            .filter(move |c| c.source == source && c.target == target)
    }

    /// Constraints restricting `target`, grouped by target step.
    pub fn by_target(&self) -> BTreeMap<&str, Vec<&StepConstraint>> {
        let mut grouped: BTreeMap<&str, Vec<&StepConstraint>> = BTreeMap::new();
        for constraint in &self.constraints {
            grouped
                .entry(constraint.target.as_str())
                .or_default()
                .push(constraint);
        }
        grouped
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Lower `available_for` declarations into ordinary matrices.
    ///
    /// For a step paired with step P, each option of P gets an entry that
    /// permits every option without `available_for` plus every option whose
    /// `available_for` lists it.
    pub fn from_available_for(model: &ModelDefinition) -> Self {
        let mut constraints = Self::new();
        for step in &model.steps {
            let Some(paired_id) = &step.available_for_step else {
                continue;
            };
            let Some(paired) = model.step(paired_id.as_str()) else {
                continue;
            };

            let mut matrix = ConstraintMatrix::new();
            for source in paired.option_ids() {
                let permitted = step.options.iter().filter(|option| match &option.available_for {
                    None => true,
                    Some(ids) => ids.contains(source),
                });
                matrix.permit(source.clone(), permitted.map(|o| o.id.clone()));
            }
            constraints.push(paired_id.clone(), step.id.clone(), matrix);
        }
        constraints
    }

    /// Check every declaration against `model` for static data errors.
    pub fn validate_against(&self, model: &ModelDefinition) -> DomainResult<()> {
        for constraint in &self.constraints {
            if constraint.source == constraint.target {
                return Err(DomainError::invariant(format!(
                    "model {}: step `{}` cannot constrain itself",
                    model.id, constraint.source
                )));
            }

            let source = model.step(constraint.source.as_str()).ok_or_else(|| {
                DomainError::invariant(format!(
                    "model {}: constraint source `{}` is not a step",
                    model.id, constraint.source
                ))
            })?;
            let target = model.step(constraint.target.as_str()).ok_or_else(|| {
                DomainError::invariant(format!(
                    "model {}: constraint target `{}` is not a step",
                    model.id, constraint.target
                ))
            })?;

            for (from, targets) in constraint.matrix.entries() {
                if source.option(from.as_str()).is_none() {
                    return Err(DomainError::invariant(format!(
                        "model {}: {} -> {} matrix has unknown source option `{from}`",
                        model.id, source.id, target.id
                    )));
                }
                if let Some(unknown) = targets
                    .iter()
                    .find(|t| target.option(t.as_str()).is_none())
                {
                    return Err(DomainError::invariant(format!(
                        "model {}: {} -> {} matrix permits unknown target option `{unknown}`",
                        model.id, source.id, target.id
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StepOption;
    use crate::model::fixtures::lamp;

    #[test]
    fn missing_entry_permits_nothing() {
        let matrix = ConstraintMatrix::from_table(&[("r", &["s", "m"])]);

        assert!(matrix.permits("r", "s"));
        assert!(!matrix.permits("r", "l"));
        assert!(!matrix.permits("g", "s"));
        assert!(matrix.allowed("g").is_none());
    }

    #[test]
    fn between_only_matches_the_declared_direction() {
        let constraints = ModelConstraints::new().with(
            "colour",
            "size",
            ConstraintMatrix::from_table(&[("r", &["s"])]),
        );

        assert_eq!(constraints.between("colour", "size").count(), 1);
        assert_eq!(constraints.between("size", "colour").count(), 0);
    }

    #[test]
    fn validate_rejects_unknown_steps_and_options() {
        let model = lamp();

        let unknown_step = ModelConstraints::new().with(
            "finish",
            "size",
            ConstraintMatrix::from_table(&[("r", &["s"])]),
        );
        assert!(matches!(
            unknown_step.validate_against(&model),
            Err(DomainError::InvariantViolation(_))
        ));

        let unknown_target = ModelConstraints::new().with(
            "colour",
            "size",
            ConstraintMatrix::from_table(&[("r", &["xl"])]),
        );
        assert!(matches!(
            unknown_target.validate_against(&model),
            Err(DomainError::InvariantViolation(msg)) if msg.contains("xl")
        ));

        let self_constraint = ModelConstraints::new().with(
            "colour",
            "colour",
            ConstraintMatrix::from_table(&[("r", &["g"])]),
        );
        assert!(self_constraint.validate_against(&model).is_err());

        let ok = ModelConstraints::new().with(
            "colour",
            "size",
            ConstraintMatrix::from_table(&[("r", &["s", "m"]), ("g", &["l"])]),
        );
        assert_eq!(ok.validate_against(&model), Ok(()));
    }

    #[test]
    fn available_for_lowers_into_a_full_matrix() {
        let mut model = lamp();
        model.steps[2].available_for_step = Some("colour".into());
        model.steps[2].options[1] = StepOption::new("exit", "EXIT", "EX").available_for(&["g"]);

        let constraints = ModelConstraints::from_available_for(&model);
        assert_eq!(constraints.len(), 1);

        let lowered = constraints.between("colour", "label").next().unwrap();
        assert!(lowered.matrix.permits("g", "exit"));
        assert!(lowered.matrix.permits("g", "none"));
        assert!(lowered.matrix.permits("r", "none"));
        assert!(!lowered.matrix.permits("r", "exit"));
        // Every paired option has an entry, so nothing is blocked by fail-closed lookups.
        assert!(lowered.matrix.allowed("b").is_some());
        assert_eq!(constraints.validate_against(&model), Ok(()));
    }

    #[test]
    fn models_without_available_for_lower_to_nothing() {
        assert!(ModelConstraints::from_available_for(&lamp()).is_empty());
    }
}
