// MacroX Backend Interfaces
// Persistence and cursor collaborators, plus an in-memory store

use std::sync::mpsc::{channel, Receiver, Sender};

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};

use crate::binder::{occupant, BindingError};
use crate::model::{MacroConfig, MacroId};
use crate::transfer::{self, TransferError};
use crate::validate::{validate, ValidationError};

/// Errors reported by a macro store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("macro has no id; it must be validated before saving")]
    MissingId,

    #[error("macro {0} not found")]
    NotFound(MacroId),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Notification that stored macros changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeNotice {
    Saved(MacroId),
    Deleted(MacroId),
    /// Edited outside the editor (profile switch, file changed on disk)
    External,
}

/// The persistence backend macros are saved to.
///
/// Implementations re-check name uniqueness and trigger exclusivity on save.
pub trait MacroStore {
    fn list_macros(&self) -> Result<Vec<MacroConfig>, StoreError>;

    /// Upsert by id
    fn save_macro(&self, config: &MacroConfig) -> Result<(), StoreError>;

    fn delete_macro(&self, id: MacroId) -> Result<(), StoreError>;

    fn export_macro(&self, config: &MacroConfig) -> Result<String, StoreError> {
        Ok(transfer::encode(config)?)
    }

    /// Decode and save a shared macro, returning what was stored
    fn import_macro(&self, blob: &str) -> Result<MacroConfig, StoreError> {
        let config = transfer::decode(blob)?;
        self.save_macro(&config)?;
        Ok(config)
    }

    /// Channel of change notices, if the backend publishes them
    fn subscribe(&self) -> Option<Receiver<ChangeNotice>> {
        None
    }
}

/// Source of the current pointer position
pub trait CursorProvider {
    fn cursor_position(&self) -> Option<(i32, i32)>;
}

/// Store kept in memory, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    macros: RwLock<IndexMap<MacroId, MacroConfig>>,
    watchers: Mutex<Vec<Sender<ChangeNotice>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.macros.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.read().is_empty()
    }

    pub fn get(&self, id: MacroId) -> Option<MacroConfig> {
        self.macros.read().get(&id).cloned()
    }

    /// Write a record without checks, as an external edit would, and announce it
    pub fn upsert_external(&self, mut config: MacroConfig) -> MacroId {
        let id = config.ensure_id();
        self.macros.write().insert(id, config);
        self.notify(ChangeNotice::External);
        id
    }

    fn notify(&self, notice: ChangeNotice) {
        self.watchers
            .lock()
            .retain(|tx| tx.send(notice.clone()).is_ok());
    }
}

impl MacroStore for MemoryStore {
    fn list_macros(&self) -> Result<Vec<MacroConfig>, StoreError> {
        Ok(self.macros.read().values().cloned().collect())
    }

    fn save_macro(&self, config: &MacroConfig) -> Result<(), StoreError> {
        let id = config.id().ok_or(StoreError::MissingId)?;
        {
            let mut macros = self.macros.write();
            let all: Vec<MacroConfig> = macros.values().cloned().collect();
            validate(config, &all)?;
            if let Some(holder) = occupant(&config.trigger, &all, Some(id)) {
                return Err(BindingError::TriggerOccupied {
                    trigger: config.trigger.clone(),
                    occupant: holder.id().unwrap_or(id),
                }
                .into());
            }
            macros.insert(id, config.clone());
        }
        log::debug!("store: saved {} ({})", config.name, id);
        self.notify(ChangeNotice::Saved(id));
        Ok(())
    }

    fn delete_macro(&self, id: MacroId) -> Result<(), StoreError> {
        if self.macros.write().shift_remove(&id).is_none() {
            return Err(StoreError::NotFound(id));
        }
        log::debug!("store: deleted {}", id);
        self.notify(ChangeNotice::Deleted(id));
        Ok(())
    }

    fn subscribe(&self) -> Option<Receiver<ChangeNotice>> {
        let (tx, rx) = channel();
        self.watchers.lock().push(tx);
        Some(rx)
    }
}
