//! Configuration sessions and the saved-configuration list.
//!
//! State lives in explicit values owned by the caller: a
//! `ConfigurationSession` per model being configured and a `MyList` over an
//! injected store. Nothing here performs IO.

pub mod custom_text;
pub mod saved;
pub mod session;

pub use custom_text::{CustomTextData, MAX_CUSTOM_TEXT_LINE_LEN, MAX_CUSTOM_TEXT_LINES};
pub use saved::{
    InMemorySavedConfigurationStore, MyList, SavedConfiguration, SavedConfigurationStore,
};
pub use session::{
    ClearCustomText, ClearReason, ClearStep, ConfigurationReset, ConfigurationSession,
    CustomTextCleared, CustomTextUpdated, OptionSelected, ResetConfiguration, SelectOption,
    SelectionCleared, SessionCommand, SessionEvent, SetCustomText,
};
