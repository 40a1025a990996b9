//! The user's list of saved configurations ("my list").

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use configurator_core::{
    DomainError, DomainResult, Entity, ModelId, OptionId, SavedConfigurationId, StepId,
};
use configurator_engine::{CodeValidation, Configuration, ModelDefinition};

use crate::custom_text::CustomTextData;
use crate::session::ConfigurationSession;

/// A frozen copy of a completed configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedConfiguration {
    pub id: SavedConfigurationId,
    pub model_id: ModelId,
    /// Every step of the model at save time, `None` where unselected.
    pub selections: BTreeMap<StepId, Option<OptionId>>,
    pub full_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_text: Option<CustomTextData>,
    pub saved_at: DateTime<Utc>,
}

impl SavedConfiguration {
    /// The saved selections fitted to `model`, as it is now.
    pub fn configuration(&self, model: &ModelDefinition) -> Configuration {
        Configuration::conform(model, self.selections.clone())
    }
}

impl Entity for SavedConfiguration {
    type Id = SavedConfigurationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Storage port for saved configurations.
pub trait SavedConfigurationStore: Send + Sync {
    fn save(&self, saved: SavedConfiguration) -> DomainResult<()>;
    fn get(&self, id: SavedConfigurationId) -> Option<SavedConfiguration>;
    /// All entries, oldest first.
    fn list(&self) -> Vec<SavedConfiguration>;
    fn remove(&self, id: SavedConfigurationId) -> Option<SavedConfiguration>;
    fn clear(&self);
}

impl<S> SavedConfigurationStore for Arc<S>
where
    S: SavedConfigurationStore + ?Sized,
{
    fn save(&self, saved: SavedConfiguration) -> DomainResult<()> {
        (**self).save(saved)
    }

    fn get(&self, id: SavedConfigurationId) -> Option<SavedConfiguration> {
        (**self).get(id)
    }

    fn list(&self) -> Vec<SavedConfiguration> {
        (**self).list()
    }

    fn remove(&self, id: SavedConfigurationId) -> Option<SavedConfiguration> {
        (**self).remove(id)
    }

    fn clear(&self) {
        (**self).clear()
    }
}

/// In-memory store for tests/dev and for hosts that persist elsewhere.
#[derive(Debug, Default)]
pub struct InMemorySavedConfigurationStore {
    inner: RwLock<HashMap<SavedConfigurationId, SavedConfiguration>>,
}

impl InMemorySavedConfigurationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SavedConfigurationStore for InMemorySavedConfigurationStore {
    fn save(&self, saved: SavedConfiguration) -> DomainResult<()> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::invariant("saved configuration store is poisoned"))?;
        map.insert(saved.id, saved);
        Ok(())
    }

    fn get(&self, id: SavedConfigurationId) -> Option<SavedConfiguration> {
        let map = self.inner.read().ok()?;
        map.get(&id).cloned()
    }

    fn list(&self) -> Vec<SavedConfiguration> {
        let map = match self.inner.read() {
            Ok(m) => m,
            Err(_) => return vec![],
        };

        let mut entries: Vec<SavedConfiguration> = map.values().cloned().collect();
        entries.sort_by(|a, b| a.saved_at.cmp(&b.saved_at).then_with(|| a.id.cmp(&b.id)));
        entries
    }

    fn remove(&self, id: SavedConfigurationId) -> Option<SavedConfiguration> {
        let mut map = self.inner.write().ok()?;
        map.remove(&id)
    }

    fn clear(&self) {
        if let Ok(mut map) = self.inner.write() {
            map.clear();
        }
    }
}

/// Saved-configuration list over an injected store.
#[derive(Debug)]
pub struct MyList<S> {
    store: S,
}

impl<S: SavedConfigurationStore> MyList<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Freeze the session's current configuration into the list.
    ///
    /// Only complete configurations that pass validation can be saved.
    pub fn add(
        &self,
        session: &ConfigurationSession,
        saved_at: DateTime<Utc>,
    ) -> DomainResult<SavedConfiguration> {
        let product = session.product_model();
        if !product.is_complete {
            let missing: Vec<&str> = product.missing_steps.iter().map(StepId::as_str).collect();
            return Err(DomainError::validation(format!(
                "cannot save an incomplete configuration, missing: {}",
                missing.join(", ")
            )));
        }
        let full_code = match session.validation() {
            CodeValidation::Valid { code } => code,
            CodeValidation::Invalid { reason } => {
                return Err(DomainError::validation(format!(
                    "cannot save an invalid configuration: {reason}"
                )));
            }
        };

        let saved = SavedConfiguration {
            id: SavedConfigurationId::new(),
            model_id: session.model().id().clone(),
            selections: session.configuration().selections().clone(),
            full_code,
            custom_text: session.custom_text().cloned(),
            saved_at,
        };
        self.store.save(saved.clone())?;

        tracing::info!(
            saved_id = %saved.id,
            model = %saved.model_id,
            code = %saved.full_code,
            "configuration saved"
        );
        Ok(saved)
    }

    pub fn get(&self, id: SavedConfigurationId) -> Option<SavedConfiguration> {
        self.store.get(id)
    }

    /// Entries, oldest first.
    pub fn list(&self) -> Vec<SavedConfiguration> {
        self.store.list()
    }

    pub fn remove(&self, id: SavedConfigurationId) -> DomainResult<SavedConfiguration> {
        let removed = self.store.remove(id).ok_or_else(DomainError::not_found)?;
        tracing::info!(saved_id = %id, "saved configuration removed");
        Ok(removed)
    }

    pub fn clear(&self) {
        self.store.clear();
        tracing::info!("saved configurations cleared");
    }

    pub fn len(&self) -> usize {
        self.store.list().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
