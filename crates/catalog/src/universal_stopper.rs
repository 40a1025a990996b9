//! Universal Stopper protective covers (`STI-13…`).
//!
//! Compatibility here is declared per option with `available_for` rather
//! than with matrices: each option names the options of its paired step it
//! can be combined with.

use configurator_core::ModelId;
use configurator_engine::{
    ModelConstraints, ModelDefinition, ModelEntry, ProductModelSchema, SeparatorMode,
    SeparatorPolicy, Step, StepOption,
};

pub const MODEL_ID: &str = "STI-13";

pub const MOUNTING: &str = "mounting";
pub const SOUNDER: &str = "sounder";
pub const FINISH: &str = "finish";
pub const LABEL: &str = "label";

pub fn definition() -> ModelDefinition {
    ModelDefinition {
        id: ModelId::from(MODEL_ID),
        name: "Universal Stopper".to_string(),
        slug: "universal-stopper".to_string(),
        steps: vec![
            Step::required(
                MOUNTING,
                "Mounting",
                vec![
                    StepOption::new("flush", "Flush mount", "0"),
                    StepOption::new("surface", "Surface mount", "1"),
                    StepOption::new("spacer", "Surface mount with spacer", "2"),
                ],
            ),
            Step::required(
                SOUNDER,
                "Sounder",
                vec![
                    StepOption::new("none", "No sounder", "00"),
                    StepOption::new("horn", "Horn", "10").available_for(&["surface", "spacer"]),
                ],
            )
            .paired_with(MOUNTING),
            Step::required(
                FINISH,
                "Cover finish",
                vec![
                    StepOption::new("clear", "Clear", "NC"),
                    StepOption::new("red", "Red", "NR"),
                    StepOption::new("green", "Green", "NG"),
                    StepOption::new("blue", "Blue", "NB")
                        .available_for(&["surface", "spacer"])
                        .with_notes("EXTENDED LEAD TIMES"),
                ],
            )
            .paired_with(MOUNTING),
            Step::optional(
                LABEL,
                "Label",
                vec![
                    StepOption::new("none", "No label", ""),
                    StepOption::new("fire", "FIRE", "FIRE").available_for(&["red"]),
                    StepOption::new("exit", "EXIT", "EXIT").available_for(&["green", "clear"]),
                ],
            )
            .paired_with(FINISH),
        ],
        step_order: vec![MOUNTING.into(), SOUNDER.into(), FINISH.into(), LABEL.into()],
        schema: ProductModelSchema {
            base_code: "STI-13".to_string(),
            parts_order: vec![MOUNTING.into(), SOUNDER.into(), FINISH.into(), LABEL.into()],
            separators: SeparatorPolicy::uniform(SeparatorMode::None)
                .with_override(LABEL, SeparatorMode::Dash),
        },
        primary_dependency_step: Some(MOUNTING.into()),
    }
}

pub fn entry() -> ModelEntry {
    ModelEntry::new(definition(), ModelConstraints::new())
}
