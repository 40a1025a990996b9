//! Free text engraved on products that offer a custom-text option.

use serde::{Deserialize, Serialize};

use configurator_core::{DomainError, DomainResult, ValueObject};

pub const MAX_CUSTOM_TEXT_LINES: usize = 4;
pub const MAX_CUSTOM_TEXT_LINE_LEN: usize = 20;

/// Ordered label lines. Always within the engraving limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct CustomTextData {
    lines: Vec<String>,
}

impl ValueObject for CustomTextData {}

impl CustomTextData {
    /// Validate and normalize `lines` (trailing whitespace is dropped).
    pub fn new<I, S>(lines: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Vec<String> = lines
            .into_iter()
            .map(|line| line.into().trim_end().to_string())
            .collect();

        if lines.len() > MAX_CUSTOM_TEXT_LINES {
            return Err(DomainError::validation(format!(
                "custom text has {} lines, at most {MAX_CUSTOM_TEXT_LINES} allowed",
                lines.len()
            )));
        }
        if let Some((index, line)) = lines
            .iter()
            .enumerate()
            .find(|(_, line)| line.chars().count() > MAX_CUSTOM_TEXT_LINE_LEN)
        {
            return Err(DomainError::validation(format!(
                "custom text line {} is {} characters, at most {MAX_CUSTOM_TEXT_LINE_LEN} allowed",
                index + 1,
                line.chars().count()
            )));
        }
        if lines.iter().all(|line| line.trim().is_empty()) {
            return Err(DomainError::validation("custom text cannot be empty"));
        }

        Ok(Self { lines })
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl TryFrom<Vec<String>> for CustomTextData {
    type Error = DomainError;

    fn try_from(lines: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(lines)
    }
}

impl From<CustomTextData> for Vec<String> {
    fn from(value: CustomTextData) -> Self {
        value.lines
    }
}
