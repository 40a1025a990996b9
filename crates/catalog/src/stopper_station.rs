//! Stopper Station push-button family (`SS2…`).
//!
//! Code layout: `SS2` + colour + cover + activation + text + `-` + language
//! + installation kit, e.g. `SS2001AB-EN`.

use configurator_core::ModelId;
use configurator_engine::{
    ConstraintMatrix, ModelConstraints, ModelDefinition, ModelEntry, ProductModelSchema,
    SeparatorMode, SeparatorPolicy, Step, StepOption,
};

pub const MODEL_ID: &str = "SS2";

pub const COLOUR: &str = "colour";
pub const COVER: &str = "cover";
pub const ACTIVATION: &str = "activation";
pub const TEXT: &str = "text";
pub const LANGUAGE: &str = "language";
pub const INSTALLATION: &str = "installationOptions";

/// Text option that carries a customer-supplied label.
pub const CUSTOM_TEXT_OPTION: &str = "ZA";

/// Language option routed to sales instead of being ordered directly.
pub const CONTACT_SALES_LANGUAGE: &str = "ZL";

const ALL_COLOURS: &[&str] = &["0", "1", "2", "3", "4"];
const ALL_ACTIVATIONS: &[&str] = &["0", "1", "2", "4", "5"];
const ALL_TEXTS: &[&str] = &["AB", "EM", "EX", "LD", "NT", "PO", "ZA"];
const ALL_LANGUAGES: &[&str] = &["EN", "ES", "FR", "ZL"];

const COLOUR_TO_ACTIVATION: &[(&str, &[&str])] = &[
    ("0", ALL_ACTIVATIONS),
    ("1", &["0", "1", "4"]),
    ("2", ALL_ACTIVATIONS),
    ("3", &["0", "1", "4"]),
    ("4", &["0", "1", "2", "4"]),
];

const ACTIVATION_TO_COLOUR: &[(&str, &[&str])] = &[
    ("0", ALL_COLOURS),
    ("1", ALL_COLOURS),
    ("2", &["0", "2", "4"]),
    ("4", ALL_COLOURS),
    ("5", &["0", "2"]),
];

const COLOUR_TO_TEXT: &[(&str, &[&str])] = &[
    ("0", &["AB", "EM", "LD", "NT", "PO", "ZA"]),
    ("1", &["EX", "NT", "ZA"]),
    ("2", &["AB", "EM", "NT", "PO", "ZA"]),
    ("3", &["EM", "EX", "LD", "NT", "ZA"]),
    ("4", &["EM", "LD", "NT", "ZA"]),
];

const TEXT_TO_COLOUR: &[(&str, &[&str])] = &[
    ("AB", &["0", "2"]),
    ("EM", &["0", "2", "3", "4"]),
    ("EX", &["1", "3"]),
    ("LD", &["0", "3", "4"]),
    ("NT", ALL_COLOURS),
    ("PO", &["0", "2"]),
    ("ZA", ALL_COLOURS),
];

// Momentary buttons are not sold with lockdown text; pneumatic units only
// carry the three fire-panel legends. No text -> activation table exists.
const ACTIVATION_TO_TEXT: &[(&str, &[&str])] = &[
    ("0", ALL_TEXTS),
    ("1", ALL_TEXTS),
    ("2", ALL_TEXTS),
    ("4", &["AB", "EM", "EX", "NT", "PO", "ZA"]),
    ("5", &["AB", "EM", "NT"]),
];

const TEXT_TO_LANGUAGE: &[(&str, &[&str])] = &[
    ("AB", ALL_LANGUAGES),
    ("EM", ALL_LANGUAGES),
    ("EX", ALL_LANGUAGES),
    ("LD", &["EN", "ES", "ZL"]),
    ("NT", ALL_LANGUAGES),
    ("PO", &["EN", "ES", "ZL"]),
    ("ZA", &["EN", "ES", "FR"]),
];

const LANGUAGE_TO_TEXT: &[(&str, &[&str])] = &[
    ("EN", ALL_TEXTS),
    ("ES", ALL_TEXTS),
    ("FR", &["AB", "EM", "EX", "NT", "ZA"]),
    ("ZL", &["AB", "EM", "EX", "LD", "NT", "PO"]),
];

const COLOUR_TO_INSTALLATION: &[(&str, &[&str])] = &[
    ("0", &["none", "kit-red"]),
    ("1", &["none", "kit-green"]),
    ("2", &["none", "kit-yellow"]),
    ("3", &["none", "kit-white"]),
    ("4", &["none", "kit-blue"]),
];

const INSTALLATION_TO_COLOUR: &[(&str, &[&str])] = &[
    ("none", ALL_COLOURS),
    ("kit-red", &["0"]),
    ("kit-green", &["1"]),
    ("kit-yellow", &["2"]),
    ("kit-white", &["3"]),
    ("kit-blue", &["4"]),
];

// The shield does not clear the pneumatic actuator. One-directional.
const COVER_TO_ACTIVATION: &[(&str, &[&str])] = &[
    ("0", ALL_ACTIVATIONS),
    ("2", &["0", "1", "2", "4"]),
];

pub fn definition() -> ModelDefinition {
    ModelDefinition {
        id: ModelId::from(MODEL_ID),
        name: "Stopper Station".to_string(),
        slug: "stopper-station".to_string(),
        steps: vec![
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
                ACTIVATION,
                "Activation",
                vec![
                    StepOption::new("0", "Key-to-reset", "0"),
                    StepOption::new("1", "Turn-to-reset", "1"),
                    StepOption::new("2", "Key-to-activate", "2"),
                    StepOption::new("4", "Momentary", "4"),
                    StepOption::new("5", "Pneumatic", "5").with_notes("EXTENDED LEAD TIMES"),
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
                    StepOption::new(CUSTOM_TEXT_OPTION, "Custom text", "ZA"),
                ],
            ),
            Step::required(
                LANGUAGE,
                "Language",
                vec![
                    StepOption::new("EN", "English", "EN"),
                    StepOption::new("ES", "Spanish", "ES"),
                    StepOption::new("FR", "French", "FR"),
                    StepOption::new(CONTACT_SALES_LANGUAGE, "Other language", "ZL")
                        .with_notes("Contact sales"),
                ],
            ),
            Step::optional(
                INSTALLATION,
                "Installation options",
                vec![
                    StepOption::new("none", "None", ""),
                    StepOption::new("kit-red", "Surface mount kit (red)", "&KIT-71100A-R"),
                    StepOption::new("kit-green", "Surface mount kit (green)", "&KIT-71100A-G"),
                    StepOption::new("kit-yellow", "Surface mount kit (yellow)", "&KIT-71100A-Y"),
                    StepOption::new("kit-white", "Surface mount kit (white)", "&KIT-71100A-W"),
                    StepOption::new("kit-blue", "Surface mount kit (blue)", "&KIT-71100A-B"),
                ],
            ),
        ],
        step_order: vec![
            COLOUR.into(),
            COVER.into(),
            ACTIVATION.into(),
            TEXT.into(),
            LANGUAGE.into(),
            INSTALLATION.into(),
        ],
        schema: ProductModelSchema {
            base_code: "SS2".to_string(),
            parts_order: vec![
                COLOUR.into(),
                COVER.into(),
                ACTIVATION.into(),
                TEXT.into(),
                LANGUAGE.into(),
                INSTALLATION.into(),
            ],
            separators: SeparatorPolicy::uniform(SeparatorMode::None)
                .with_override(LANGUAGE, SeparatorMode::Dash),
        },
        primary_dependency_step: Some(COLOUR.into()),
    }
}

pub fn constraints() -> ModelConstraints {
    ModelConstraints::new()
        .with(COLOUR, ACTIVATION, ConstraintMatrix::from_table(COLOUR_TO_ACTIVATION))
        .with(ACTIVATION, COLOUR, ConstraintMatrix::from_table(ACTIVATION_TO_COLOUR))
        .with(COLOUR, TEXT, ConstraintMatrix::from_table(COLOUR_TO_TEXT))
        .with(TEXT, COLOUR, ConstraintMatrix::from_table(TEXT_TO_COLOUR))
        .with(ACTIVATION, TEXT, ConstraintMatrix::from_table(ACTIVATION_TO_TEXT))
        .with(TEXT, LANGUAGE, ConstraintMatrix::from_table(TEXT_TO_LANGUAGE))
        .with(LANGUAGE, TEXT, ConstraintMatrix::from_table(LANGUAGE_TO_TEXT))
        .with(COLOUR, INSTALLATION, ConstraintMatrix::from_table(COLOUR_TO_INSTALLATION))
        .with(INSTALLATION, COLOUR, ConstraintMatrix::from_table(INSTALLATION_TO_COLOUR))
        .with(COVER, ACTIVATION, ConstraintMatrix::from_table(COVER_TO_ACTIVATION))
}

pub fn entry() -> ModelEntry {
    ModelEntry::new(definition(), constraints())
}

#[cfg(test)]
mod tests {
    use super::*;
    use configurator_core::OptionId;
    use configurator_engine::{Configuration, SelectionChange};

    fn config(selections: &[(&str, &str)]) -> Configuration {
        Configuration::from_selections(&definition(), selections.iter().copied())
    }

    #[test]
    fn catalog_data_is_consistent() {
        assert_eq!(entry().validate(), Ok(()));
    }

    #[test]
    fn renders_reference_code() {
        let product = entry().build(&config(&[
            (COLOUR, "0"),
            (COVER, "0"),
            (ACTIVATION, "1"),
            (TEXT, "AB"),
            (LANGUAGE, "EN"),
            (INSTALLATION, "none"),
        ]));

        assert_eq!(product.full_code, "SS2001AB-EN");
        assert!(product.is_complete);
        assert_eq!(product.parts[INSTALLATION], "");
        assert_eq!(product.parts[LANGUAGE], "EN");
    }

    #[test]
    fn installation_kit_is_appended_without_separator() {
        let product = entry().build(&config(&[
            (COLOUR, "0"),
            (COVER, "2"),
            (ACTIVATION, "0"),
            (TEXT, "EM"),
            (LANGUAGE, "ES"),
            (INSTALLATION, "kit-red"),
        ]));

        assert_eq!(product.full_code, "SS2020EM-ES&KIT-71100A-R");
    }

    #[test]
    fn installation_is_optional() {
        let product = entry().build(&config(&[
            (COLOUR, "3"),
            (COVER, "0"),
            (ACTIVATION, "4"),
            (TEXT, "EX"),
            (LANGUAGE, "FR"),
        ]));

        assert!(product.is_complete);
        assert_eq!(product.full_code, "SS2304EX-FR");
    }

    #[test]
    fn contact_sales_language_is_a_complete_selection() {
        let entry = entry();
        let config = config(&[
            (COLOUR, "0"),
            (COVER, "0"),
            (ACTIVATION, "0"),
            (TEXT, "LD"),
            (LANGUAGE, CONTACT_SALES_LANGUAGE),
        ]);

        let product = entry.build(&config);
        assert!(product.is_complete);
        assert_eq!(product.full_code, "SS2000LD-ZL");
        assert!(entry.validate_configuration(&config).is_valid());
    }

    #[test]
    fn colour_narrows_several_steps_at_once() {
        let availability = entry().availability(&config(&[(COLOUR, "1")]));

        let activation: Vec<&str> = availability[ACTIVATION]
            .available_option_ids
            .iter()
            .map(OptionId::as_str)
            .collect();
        assert_eq!(activation, vec!["0", "1", "4"]);
        assert!(availability[TEXT].is_available("EX"));
        assert!(!availability[TEXT].is_available("AB"));
        assert!(availability[INSTALLATION].is_available("kit-green"));
        assert!(!availability[INSTALLATION].is_available("kit-red"));
    }

    #[test]
    fn activation_to_text_is_one_directional() {
        let entry = entry();

        // Lockdown text leaves the momentary button selectable...
        let lockdown = entry.availability(&config(&[(TEXT, "LD")]));
        assert!(lockdown[ACTIVATION].is_available("4"));

        // ...but a momentary button removes lockdown text.
        let momentary = entry.availability(&config(&[(ACTIVATION, "4")]));
        assert!(!momentary[TEXT].is_available("LD"));
    }

    #[test]
    fn three_way_restriction_on_text() {
        // Yellow allows AB/EM/NT/PO/ZA, pneumatic allows AB/EM/NT, French
        // excludes PO: only the intersection remains.
        let availability = entry().availability(&config(&[
            (COLOUR, "2"),
            (ACTIVATION, "5"),
            (LANGUAGE, "FR"),
        ]));

        let texts: Vec<&str> = availability[TEXT]
            .available_option_ids
            .iter()
            .map(OptionId::as_str)
            .collect();
        assert_eq!(texts, vec!["AB", "EM", "NT"]);
    }

    #[test]
    fn changing_colour_reports_dependent_selections() {
        let entry = entry();
        let current = config(&[
            (COLOUR, "0"),
            (COVER, "0"),
            (ACTIVATION, "5"),
            (TEXT, "PO"),
            (LANGUAGE, "EN"),
            (INSTALLATION, "kit-red"),
        ]);

        let invalidations =
            entry.invalidations_after_change(&current, &SelectionChange::select(COLOUR, "3"));
        let cleared: Vec<(&str, &str)> = invalidations
            .iter()
            .map(|i| (i.step.as_str(), i.option.as_str()))
            .collect();
        assert_eq!(
            cleared,
            vec![(ACTIVATION, "5"), (TEXT, "PO"), (INSTALLATION, "kit-red")]
        );
    }

    #[test]
    fn shield_excludes_pneumatic_activation() {
        let availability = entry().availability(&config(&[(COVER, "2")]));
        assert!(!availability[ACTIVATION].is_available("5"));
        assert!(availability[ACTIVATION].is_available("4"));
    }
}
