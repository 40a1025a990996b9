//! Global ReSet push-button family (`G3…`).
//!
//! Only a small set of the mathematically possible combinations are real
//! products, so this family is driven by an exhaustive allow-list. Its
//! pairwise matrices are derived from that list rather than declared by hand.
//!
//! Code layout: `G3` + model + colour + cover + button type + text + `-` +
//! language, e.g. `G3A209PO-EN`.

use configurator_core::{DomainResult, ModelId};
use configurator_engine::{
    AllowList, CodeLayout, ModelDefinition, ModelEntry, ProductModelSchema, SeparatorMode,
    SeparatorPolicy, Step, StepOption,
};

pub const MODEL_ID: &str = "G3";

pub const MODEL: &str = "model";
pub const COLOUR: &str = "colour";
pub const COVER: &str = "cover";
pub const BUTTON_TYPE: &str = "buttonType";
pub const TEXT: &str = "text";
pub const LANGUAGE: &str = "language";

pub const CODE_PATTERN: &str = r"^G3(?P<model>[AC])(?P<colour>[0-4])(?P<cover>[02])(?P<buttonType>[019])(?P<text>[A-Z]{2})-(?P<language>[A-Z]{2})$";

/// Every orderable G3 product code.
pub const APPROVED_CODES: &[&str] = &[
    // Standard housing
    "G3A200AB-EN",
    "G3A201AB-EN",
    "G3A220AB-EN",
    "G3A209PO-EN",
    "G3A200PO-EN",
    "G3A229EM-EN",
    "G3A300EX-EN",
    "G3A301EX-EN",
    "G3A320LD-EN",
    "G3A300NT-EN",
    "G3A309ZA-EN",
    "G3A400EM-EN",
    "G3A401EM-EN",
    "G3A420LD-EN",
    "G3A409NT-EN",
    "G3A400ZA-EN",
    // Low-profile housing
    "G3C000EM-EN",
    "G3C001EM-EN",
    "G3C020PO-EN",
    "G3C009AB-EN",
    "G3C000ZA-EN",
    "G3C100EX-EN",
    "G3C101EX-EN",
    "G3C120NT-EN",
    "G3C109EX-EN",
    "G3C400LD-EN",
    "G3C401LD-EN",
    "G3C420EM-EN",
    "G3C409ZA-EN",
];

/// Housing → colours, as published in the product catalog. Kept as an audit
/// table: it must match what the allow-list implies.
pub const MODEL_TO_COLOUR: &[(&str, &[&str])] = &[("A", &["2", "3", "4"]), ("C", &["0", "1", "4"])];

pub fn definition() -> ModelDefinition {
    ModelDefinition {
        id: ModelId::from(MODEL_ID),
        name: "Global ReSet".to_string(),
        slug: "global-reset".to_string(),
        steps: vec![
            Step::required(
                MODEL,
                "Model",
                vec![
                    StepOption::new("A", "Standard housing", "A"),
                    StepOption::new("C", "Low-profile housing", "C"),
                ],
            ),
            Step::required(
                COLOUR,
                "Colour",
                vec![
                    StepOption::new("0", "Red", "0"),
                    StepOption::new("1", "Green", "1"),
                    StepOption::new("2", "Yellow", "2"),
                    StepOption::new("3", "White", "3"),
                    StepOption::new("4", "Blue", "4"),
                ],
            ),
            Step::required(
                COVER,
                "Cover",
                vec![
                    StepOption::new("0", "No cover", "0"),
                    StepOption::new("2", "Protective shield", "2"),
                ],
            ),
            Step::required(
                BUTTON_TYPE,
                "Button type",
                vec![
                    StepOption::new("0", "Key-to-reset", "0"),
                    StepOption::new("1", "Turn-to-reset", "1"),
                    StepOption::new("9", "Momentary", "9"),
                ],
            ),
            Step::required(
                TEXT,
                "Label text",
                vec![
                    StepOption::new("AB", "ABORT", "AB"),
                    StepOption::new("EM", "EMERGENCY", "EM"),
                    StepOption::new("EX", "EMERGENCY EXIT", "EX"),
                    StepOption::new("LD", "LOCKDOWN", "LD"),
                    StepOption::new("NT", "No text", "NT"),
                    StepOption::new("PO", "EMERGENCY POWER OFF", "PO"),
                    StepOption::new("ZA", "Custom text", "ZA"),
                ],
            ),
            Step::required(
                LANGUAGE,
                "Language",
                vec![StepOption::new("EN", "English", "EN")],
            ),
        ],
        step_order: vec![
            MODEL.into(),
            COLOUR.into(),
            COVER.into(),
            BUTTON_TYPE.into(),
            TEXT.into(),
            LANGUAGE.into(),
        ],
        schema: ProductModelSchema {
            base_code: "G3".to_string(),
            parts_order: vec![
                MODEL.into(),
                COLOUR.into(),
                COVER.into(),
                BUTTON_TYPE.into(),
                TEXT.into(),
                LANGUAGE.into(),
            ],
            separators: SeparatorPolicy::uniform(SeparatorMode::None)
                .with_override(LANGUAGE, SeparatorMode::Dash),
        },
        primary_dependency_step: Some(MODEL.into()),
    }
}

pub fn layout() -> DomainResult<CodeLayout> {
    CodeLayout::new(
        "G3",
        &[
            (MODEL, SeparatorMode::None),
            (COLOUR, SeparatorMode::None),
            (COVER, SeparatorMode::None),
            (BUTTON_TYPE, SeparatorMode::None),
            (TEXT, SeparatorMode::None),
            (LANGUAGE, SeparatorMode::Dash),
        ],
        CODE_PATTERN,
    )
}

pub fn allow_list() -> DomainResult<AllowList> {
    AllowList::new(&definition(), layout()?, APPROVED_CODES)
}

pub fn entry() -> DomainResult<ModelEntry> {
    let list = allow_list()?;
    let constraints = list.derive_constraints();
    Ok(ModelEntry::new(definition(), constraints).with_allow_list(list))
}
