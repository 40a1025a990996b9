use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use configurator_core::{Aggregate, AggregateRoot, DomainError, Event, OptionId, SessionId, StepId};
use configurator_engine::{
    AvailabilityMap, CodeValidation, Configuration, ModelEntry, ProductModel, SelectionChange,
};

use crate::custom_text::CustomTextData;

/// Aggregate root: one user configuring one model.
///
/// The session never clears a selection on its own initiative: when a new
/// selection makes others incompatible, `handle` asks the engine which ones,
/// and records each clearing as an explicit event.
#[derive(Debug, Clone)]
pub struct ConfigurationSession {
    id: SessionId,
    model: Arc<ModelEntry>,
    configuration: Configuration,
    custom_text: Option<CustomTextData>,
    version: u64,
}

impl ConfigurationSession {
    pub fn new(model: Arc<ModelEntry>) -> Self {
        Self::with_id(SessionId::new(), model)
    }

    pub fn with_id(id: SessionId, model: Arc<ModelEntry>) -> Self {
        let configuration = model.empty_configuration();
        Self {
            id,
            model,
            configuration,
            custom_text: None,
            version: 0,
        }
    }

    pub fn model(&self) -> &ModelEntry {
        &self.model
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn custom_text(&self) -> Option<&CustomTextData> {
        self.custom_text.as_ref()
    }

    pub fn availability(&self) -> AvailabilityMap {
        self.model.availability(&self.configuration)
    }

    pub fn product_model(&self) -> ProductModel {
        self.model.build(&self.configuration)
    }

    pub fn validation(&self) -> CodeValidation {
        self.model.validate_configuration(&self.configuration)
    }
}

impl AggregateRoot for ConfigurationSession {
    type Id = SessionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: SelectOption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub step: StepId,
    pub option: OptionId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ClearStep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearStep {
    pub step: StepId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ResetConfiguration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetConfiguration {
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetCustomText.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetCustomText {
    pub lines: Vec<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ClearCustomText.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearCustomText {
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionCommand {
    SelectOption(SelectOption),
    ClearStep(ClearStep),
    ResetConfiguration(ResetConfiguration),
    SetCustomText(SetCustomText),
    ClearCustomText(ClearCustomText),
}

/// Why a selection went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearReason {
    /// The user cleared the step.
    User,
    /// Another selection made it incompatible.
    Invalidated,
}

/// Event: OptionSelected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSelected {
    pub session_id: SessionId,
    pub step: StepId,
    pub option: OptionId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SelectionCleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionCleared {
    pub session_id: SessionId,
    pub step: StepId,
    /// The selection that was removed.
    pub option: OptionId,
    pub reason: ClearReason,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ConfigurationReset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationReset {
    pub session_id: SessionId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CustomTextUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomTextUpdated {
    pub session_id: SessionId,
    pub text: CustomTextData,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CustomTextCleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomTextCleared {
    pub session_id: SessionId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    OptionSelected(OptionSelected),
    SelectionCleared(SelectionCleared),
    ConfigurationReset(ConfigurationReset),
    CustomTextUpdated(CustomTextUpdated),
    CustomTextCleared(CustomTextCleared),
}

impl Event for SessionEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::OptionSelected(_) => "configurator.session.option_selected",
            SessionEvent::SelectionCleared(_) => "configurator.session.selection_cleared",
            SessionEvent::ConfigurationReset(_) => "configurator.session.reset",
            SessionEvent::CustomTextUpdated(_) => "configurator.session.custom_text_updated",
            SessionEvent::CustomTextCleared(_) => "configurator.session.custom_text_cleared",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            SessionEvent::OptionSelected(e) => e.occurred_at,
            SessionEvent::SelectionCleared(e) => e.occurred_at,
            SessionEvent::ConfigurationReset(e) => e.occurred_at,
            SessionEvent::CustomTextUpdated(e) => e.occurred_at,
            SessionEvent::CustomTextCleared(e) => e.occurred_at,
        }
    }
}

impl Aggregate for ConfigurationSession {
    type Command = SessionCommand;
    type Event = SessionEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            SessionEvent::OptionSelected(e) => {
                self.configuration.select(e.step.as_str(), e.option.clone());
            }
            SessionEvent::SelectionCleared(e) => {
                self.configuration.clear(e.step.as_str());
            }
            SessionEvent::ConfigurationReset(_) => {
                self.configuration.reset();
                self.custom_text = None;
            }
            SessionEvent::CustomTextUpdated(e) => {
                self.custom_text = Some(e.text.clone());
            }
            SessionEvent::CustomTextCleared(_) => {
                self.custom_text = None;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            SessionCommand::SelectOption(cmd) => Ok(self.handle_select(cmd)),
            SessionCommand::ClearStep(cmd) => Ok(self.handle_clear(cmd)),
            SessionCommand::ResetConfiguration(cmd) => Ok(self.handle_reset(cmd)),
            SessionCommand::SetCustomText(cmd) => self.handle_set_custom_text(cmd),
            SessionCommand::ClearCustomText(cmd) => Ok(self.handle_clear_custom_text(cmd)),
        }
    }
}

impl ConfigurationSession {
    fn handle_select(&self, cmd: &SelectOption) -> Vec<SessionEvent> {
        if self.model.definition().option(cmd.step.as_str(), cmd.option.as_str()).is_none() {
            tracing::debug!(
                session = %self.id,
                step = %cmd.step,
                option = %cmd.option,
                "ignoring selection of unknown step or option"
            );
            return Vec::new();
        }
        if self.configuration.selected(cmd.step.as_str()) == Some(&cmd.option) {
            return Vec::new();
        }

        // The new selection wins: everything it invalidates is cleared, and so
        // is anything still blocking it afterwards.
        let change = SelectionChange::select(cmd.step.clone(), cmd.option.clone());
        let mut invalidated = self
            .model
            .invalidations_after_change(&self.configuration, &change);
        let mut next = change.applied_to(&self.configuration);
        for invalidation in &invalidated {
            next.clear(invalidation.step.as_str());
        }
        invalidated.extend(self.model.blocking_selections(
            &next,
            cmd.step.as_str(),
            cmd.option.as_str(),
        ));

        let mut events = Vec::with_capacity(1 + invalidated.len());
        events.push(SessionEvent::OptionSelected(OptionSelected {
            session_id: self.id,
            step: cmd.step.clone(),
            option: cmd.option.clone(),
            occurred_at: cmd.occurred_at,
        }));
        events.extend(invalidated.into_iter().map(|invalidation| {
            SessionEvent::SelectionCleared(SelectionCleared {
                session_id: self.id,
                step: invalidation.step,
                option: invalidation.option,
                reason: ClearReason::Invalidated,
                occurred_at: cmd.occurred_at,
            })
        }));
        events
    }

    fn handle_clear(&self, cmd: &ClearStep) -> Vec<SessionEvent> {
        let Some(previous) = self.configuration.selected(cmd.step.as_str()) else {
            return Vec::new();
        };
        vec![SessionEvent::SelectionCleared(SelectionCleared {
            session_id: self.id,
            step: cmd.step.clone(),
            option: previous.clone(),
            reason: ClearReason::User,
            occurred_at: cmd.occurred_at,
        })]
    }

    fn handle_reset(&self, cmd: &ResetConfiguration) -> Vec<SessionEvent> {
        if self.configuration.selected_count() == 0 && self.custom_text.is_none() {
            return Vec::new();
        }
        vec![SessionEvent::ConfigurationReset(ConfigurationReset {
            session_id: self.id,
            occurred_at: cmd.occurred_at,
        })]
    }

    fn handle_set_custom_text(
        &self,
        cmd: &SetCustomText,
    ) -> Result<Vec<SessionEvent>, DomainError> {
        let text = CustomTextData::new(cmd.lines.iter().map(String::as_str))?;
        if self.custom_text.as_ref() == Some(&text) {
            return Ok(Vec::new());
        }
        Ok(vec![SessionEvent::CustomTextUpdated(CustomTextUpdated {
            session_id: self.id,
            text,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_clear_custom_text(&self, cmd: &ClearCustomText) -> Vec<SessionEvent> {
        if self.custom_text.is_none() {
            return Vec::new();
        }
        vec![SessionEvent::CustomTextCleared(CustomTextCleared {
            session_id: self.id,
            occurred_at: cmd.occurred_at,
        })]
    }
}
