//! Reports behind each subcommand, and their text rendering.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Result, anyhow};
use serde::Serialize;

use configurator_core::{ModelId, OptionId, StepId};
use configurator_engine::{
    CodeValidation, Configuration, Invalidation, ModelEntry, ModelRegistry,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelSummary {
    pub id: ModelId,
    pub name: String,
    pub slug: String,
    pub steps: usize,
    pub allow_list: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionReport {
    pub id: OptionId,
    pub label: String,
    pub code: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub id: StepId,
    pub title: String,
    pub required: bool,
    pub selected: Option<OptionId>,
    /// `false` when the current selection conflicts with other selections.
    pub selection_valid: bool,
    pub options: Vec<OptionReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepsReport {
    pub model: ModelId,
    pub steps: Vec<StepReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub model: ModelId,
    pub full_code: String,
    pub is_complete: bool,
    pub missing_steps: Vec<StepId>,
    pub validation: CodeValidation,
    pub invalid_selections: Vec<Invalidation>,
}

pub fn models(registry: &ModelRegistry) -> Vec<ModelSummary> {
    registry
        .iter()
        .map(|entry| ModelSummary {
            id: entry.id().clone(),
            name: entry.definition().name.clone(),
            slug: entry.definition().slug.clone(),
            steps: entry.definition().steps.len(),
            allow_list: entry.allow_list().is_some(),
        })
        .collect()
}

pub fn steps(registry: &ModelRegistry, model: &str, selections: &[String]) -> Result<StepsReport> {
    let entry = resolve(registry, model)?;
    let config = parse_selections(&entry, selections);
    let availability = entry.availability(&config);

    let steps = entry
        .definition()
        .ordered_steps()
        .map(|step| {
            let available = availability.get(step.id.as_str());
            StepReport {
                id: step.id.clone(),
                title: step.title.clone(),
                required: step.required,
                selected: config.selected(step.id.as_str()).cloned(),
                selection_valid: available.is_none_or(|a| !a.has_invalid_selection()),
                options: step
                    .options
                    .iter()
                    .map(|option| OptionReport {
                        id: option.id.clone(),
                        label: option.label.clone(),
                        code: option.code.clone(),
                        available: available.is_some_and(|a| a.is_available(option.id.as_str())),
                        notes: option.notes.clone(),
                    })
                    .collect(),
            }
        })
        .collect();

    Ok(StepsReport {
        model: entry.id().clone(),
        steps,
    })
}

pub fn build(registry: &ModelRegistry, model: &str, selections: &[String]) -> Result<BuildReport> {
    let entry = resolve(registry, model)?;
    let config = parse_selections(&entry, selections);
    let product = entry.build(&config);

    Ok(BuildReport {
        model: entry.id().clone(),
        full_code: product.full_code,
        is_complete: product.is_complete,
        missing_steps: product.missing_steps,
        validation: entry.validate_configuration(&config),
        invalid_selections: entry.invalid_selections(&config),
    })
}

fn resolve(registry: &ModelRegistry, model: &str) -> Result<Arc<ModelEntry>> {
    registry
        .resolve(model)
        .ok_or_else(|| anyhow!("unknown model `{model}` (try `configurator models`)"))
}

/// Parse `step=option` arguments. Malformed pairs and unknown ids are skipped
/// with a warning.
fn parse_selections(entry: &ModelEntry, selections: &[String]) -> Configuration {
    let model = entry.definition();
    let mut config = entry.empty_configuration();

    for raw in selections {
        let Some((step, option)) = raw.split_once('=') else {
            tracing::warn!(argument = %raw, "ignoring selection, expected `step=option`");
            continue;
        };
        let (step, option) = (step.trim(), option.trim());
        if model.option(step, option).is_none() {
            tracing::warn!(model = %model.id, step, option, "ignoring unknown step or option");
            continue;
        }
        config.select(step, option);
    }
    config
}

pub fn render_models<W: Write>(report: &[ModelSummary], out: &mut W) -> io::Result<()> {
    for model in report {
        let kind = if model.allow_list { "allow-list" } else { "matrices" };
        writeln!(
            out,
            "{:<8} {:<20} {:<18} {} steps, {kind}",
            model.id, model.slug, model.name, model.steps
        )?;
    }
    Ok(())
}

pub fn render_steps<W: Write>(report: &StepsReport, out: &mut W) -> io::Result<()> {
    writeln!(out, "model {}", report.model)?;
    for step in &report.steps {
        let required = if step.required { "required" } else { "optional" };
        let state = match (&step.selected, step.selection_valid) {
            (None, _) => "unselected".to_string(),
            (Some(option), true) => format!("selected {option}"),
            (Some(option), false) => format!("selected {option} (INVALID)"),
        };
        writeln!(out, "\n{} [{}] {required}, {state}", step.title, step.id)?;

        for option in &step.options {
            let marker = if step.selected.as_ref() == Some(&option.id) { '*' } else { ' ' };
            let availability = if option.available { "" } else { "  unavailable" };
            let notes = option
                .notes
                .as_deref()
                .map(|n| format!("  ({n})"))
                .unwrap_or_default();
            writeln!(
                out,
                "  {marker} {:<10} {:<28}{availability}{notes}",
                option.id, option.label
            )?;
        }
    }
    Ok(())
}

pub fn render_build<W: Write>(report: &BuildReport, out: &mut W) -> io::Result<()> {
    writeln!(out, "model      {}", report.model)?;
    writeln!(out, "code       {}", report.full_code)?;
    writeln!(out, "complete   {}", report.is_complete)?;
    if !report.missing_steps.is_empty() {
        let missing: Vec<&str> = report.missing_steps.iter().map(StepId::as_str).collect();
        writeln!(out, "missing    {}", missing.join(", "))?;
    }
    match &report.validation {
        CodeValidation::Valid { .. } => writeln!(out, "validation valid")?,
        CodeValidation::Invalid { reason } => writeln!(out, "validation invalid: {reason}")?,
    }
    for invalid in &report.invalid_selections {
        writeln!(out, "conflict   {} = {}", invalid.step, invalid.option)?;
    }
    Ok(())
}
