//! Exhaustive allow-lists of full product codes.
//!
//! Some model families have a combinatorial space that pairwise matrices
//! cannot describe exactly: every pair of values is legal somewhere, yet most
//! full combinations are not real products. Those models enumerate their legal
//! codes instead, and per-step options are derived by filtering the list.

use std::collections::{BTreeMap, BTreeSet};

use regex::Regex;
use serde::{Deserialize, Serialize};

use configurator_core::{DomainError, DomainResult, ModelId, OptionId, StepId};

use crate::configuration::Configuration;
use crate::constraints::{ConstraintMatrix, ModelConstraints};
use crate::model::{ModelDefinition, SeparatorMode};

/// Fixed-position layout of a code family: a prefix followed by one fragment
/// per axis, parsed back with a family-specific pattern whose named groups
/// are the axis step ids.
#[derive(Debug, Clone)]
pub struct CodeLayout {
    prefix: String,
    axes: Vec<(StepId, SeparatorMode)>,
    pattern: Regex,
}

impl CodeLayout {
    pub fn new(
        prefix: impl Into<String>,
        axes: &[(&str, SeparatorMode)],
        pattern: &str,
    ) -> DomainResult<Self> {
        let pattern = Regex::new(pattern)
            .map_err(|e| DomainError::invariant(format!("invalid code pattern: {e}")))?;

        let groups: BTreeSet<&str> = pattern.capture_names().flatten().collect();
        if let Some((missing, _)) = axes.iter().find(|(axis, _)| !groups.contains(axis)) {
            return Err(DomainError::invariant(format!(
                "code pattern has no capture group for axis `{missing}`"
            )));
        }

        Ok(Self {
            prefix: prefix.into(),
            axes: axes
                .iter()
                .map(|(axis, separator)| (StepId::from(*axis), *separator))
                .collect(),
            pattern,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn axes(&self) -> impl Iterator<Item = &StepId> {
        self.axes.iter().map(|(axis, _)| axis)
    }

    /// Split `code` into per-axis fragments. `None` when it does not match.
    pub fn parse(&self, code: &str) -> Option<BTreeMap<StepId, String>> {
        let captures = self.pattern.captures(code)?;
        self.axes
            .iter()
            .map(|(axis, _)| {
                captures
                    .name(axis.as_str())
                    .map(|m| (axis.clone(), m.as_str().to_string()))
            })
            .collect()
    }

    /// Concatenate the prefix and per-axis fragments. `None` if any axis is
    /// missing.
    pub fn render(&self, fragments: &BTreeMap<StepId, String>) -> Option<String> {
        let mut code = self.prefix.clone();
        for (axis, separator) in &self.axes {
            code.push_str(separator.as_str());
            code.push_str(fragments.get(axis)?);
        }
        Some(code)
    }
}

/// Outcome of checking a selection against an allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CodeValidation {
    Valid { code: String },
    Invalid { reason: String },
}

impl CodeValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, CodeValidation::Valid { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            CodeValidation::Valid { .. } => None,
            CodeValidation::Invalid { reason } => Some(reason),
        }
    }
}

#[derive(Debug, Clone)]
struct AllowedCode {
    code: String,
    values: BTreeMap<StepId, OptionId>,
}

/// The approved product codes of one model, parsed into option ids.
#[derive(Debug, Clone)]
pub struct AllowList {
    model_id: ModelId,
    layout: CodeLayout,
    entries: Vec<AllowedCode>,
    /// Axis → option id → code fragment.
    fragments: BTreeMap<StepId, BTreeMap<OptionId, String>>,
    /// Axis → option ids in declaration order.
    option_order: BTreeMap<StepId, Vec<OptionId>>,
}

impl AllowList {
    /// Parse `codes` against `layout` and `model`.
    ///
    /// Codes that do not match the pattern, or whose fragments the model does
    /// not declare, are left out. Layout axes the model does not declare are a
    /// static data error.
    pub fn new(model: &ModelDefinition, layout: CodeLayout, codes: &[&str]) -> DomainResult<Self> {
        let mut fragments = BTreeMap::new();
        let mut by_fragment: BTreeMap<&StepId, BTreeMap<&str, OptionId>> = BTreeMap::new();
        let mut option_order = BTreeMap::new();

        for axis in layout.axes() {
            let step = model.step(axis.as_str()).ok_or_else(|| {
                DomainError::invariant(format!(
                    "model {}: code layout axis `{axis}` is not a step",
                    model.id
                ))
            })?;

            let mut reverse = BTreeMap::new();
            for option in &step.options {
                if reverse.insert(option.code.as_str(), option.id.clone()).is_some() {
                    return Err(DomainError::invariant(format!(
                        "model {}: code `{}` is shared by several `{axis}` options",
                        model.id, option.code
                    )));
                }
            }
            by_fragment.insert(axis, reverse);
            fragments.insert(
                axis.clone(),
                step.options
                    .iter()
                    .map(|o| (o.id.clone(), o.code.clone()))
                    .collect::<BTreeMap<_, _>>(),
            );
            option_order.insert(axis.clone(), step.option_ids().cloned().collect::<Vec<_>>());
        }

        let mut entries = Vec::with_capacity(codes.len());
        for code in codes {
            let Some(parsed) = layout.parse(code) else {
                tracing::debug!(model = %model.id, code, "allow-list code does not match pattern");
                continue;
            };
            let values: Option<BTreeMap<StepId, OptionId>> = parsed
                .iter()
                .map(|(axis, fragment)| {
                    by_fragment
                        .get(axis)
                        .and_then(|reverse| reverse.get(fragment.as_str()))
                        .map(|option| (axis.clone(), option.clone()))
                })
                .collect();
            match values {
                Some(values) => entries.push(AllowedCode {
                    code: code.to_string(),
                    values,
                }),
                None => {
                    tracing::debug!(
                        model = %model.id,
                        code,
                        "allow-list code uses undeclared fragments"
                    );
                }
            }
        }

        Ok(Self {
            model_id: model.id.clone(),
            layout,
            entries,
            fragments,
            option_order,
        })
    }

    pub fn model_id(&self) -> &ModelId {
        &self.model_id
    }

    pub fn layout(&self) -> &CodeLayout {
        &self.layout
    }

    /// Effective approved codes (malformed declarations excluded).
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.code.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.iter().any(|e| e.code == code)
    }

    /// Fixed-position code for a full selection; `None` if any axis is unset.
    pub fn build_code(&self, selection: &Configuration) -> Option<String> {
        let fragments = self
            .layout
            .axes()
            .map(|axis| {
                let option = selection.selected(axis.as_str())?;
                let fragment = self.fragments.get(axis)?.get(option)?;
                Some((axis.clone(), fragment.clone()))
            })
            .collect::<Option<BTreeMap<_, _>>>()?;
        self.layout.render(&fragments)
    }

    pub fn validate(&self, selection: &Configuration) -> CodeValidation {
        let Some(code) = self.build_code(selection) else {
            let missing: Vec<&str> = self
                .layout
                .axes()
                .filter(|axis| {
                    selection
                        .selected(axis.as_str())
                        .and_then(|o| self.fragments.get(*axis)?.get(o))
                        .is_none()
                })
                .map(StepId::as_str)
                .collect();
            return CodeValidation::Invalid {
                reason: format!("incomplete selection, missing: {}", missing.join(", ")),
            };
        };

        if self.contains(&code) {
            CodeValidation::Valid { code }
        } else {
            CodeValidation::Invalid {
                reason: format!("{code} is not an approved {} product code", self.model_id),
            }
        }
    }

    /// Legal values of `axis` given the other axes of `partial`.
    ///
    /// Selected values on other axes must match exactly; unset axes do not
    /// filter; the current value of `axis` itself is ignored. Results follow
    /// the step's declared option order.
    pub fn derive_legal_options(&self, axis: &str, partial: &Configuration) -> Vec<OptionId> {
        let Some(order) = self.option_order.get(axis) else {
            return Vec::new();
        };

        let filters: Vec<(&StepId, &OptionId)> = self
            .layout
            .axes()
            .filter(|other| *other != axis)
            .filter_map(|other| partial.selected(other.as_str()).map(|o| (other, o)))
            .collect();

        let legal: BTreeSet<&OptionId> = self
            .entries
            .iter()
            .filter(|entry| {
                filters
                    .iter()
                    .all(|(other, value)| entry.values.get(*other) == Some(*value))
            })
            .filter_map(|entry| entry.values.get(axis))
            .collect();

        order.iter().filter(|id| legal.contains(id)).cloned().collect()
    }

    /// Pairwise matrices implied by the allow-list, for every ordered pair of
    /// axes. Values that never occur in an approved code get no entry.
    pub fn derive_constraints(&self) -> ModelConstraints {
        let axes: Vec<&StepId> = self.layout.axes().collect();
        let mut constraints = ModelConstraints::new();

        for source in &axes {
            for target in &axes {
                if source == target {
                    continue;
                }
                let mut matrix = ConstraintMatrix::new();
                for entry in &self.entries {
                    if let (Some(from), Some(to)) =
                        (entry.values.get(*source), entry.values.get(*target))
                    {
                        matrix.permit(from.clone(), [to.clone()]);
                    }
                }
                constraints.push((*source).clone(), (*target).clone(), matrix);
            }
        }
        constraints
    }
}
