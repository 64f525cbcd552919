// MacroX Macro Model
// The macro value object and its action-list editing operations

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::action::Action;
use crate::mode::ExecutionMode;
use crate::trigger::Trigger;

/// Permanent identity of a saved macro
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MacroId(Uuid);

impl MacroId {
    /// Fresh random identity
    pub fn new() -> Self {
        MacroId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MacroId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MacroId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MacroId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(MacroId)
    }
}

/// A named action sequence bound to a trigger.
///
/// The id is absent until the first successful save and never changes after
/// that. Everything else is edited through the methods below or directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroConfig {
    #[serde(
        default,
        deserialize_with = "deserialize_id",
        skip_serializing_if = "Option::is_none"
    )]
    id: Option<MacroId>,
    pub name: String,
    #[serde(default)]
    pub trigger: Trigger,
    #[serde(default)]
    pub mode: ExecutionMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_delay_ms: Option<u32>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

// Stored files may carry `"id": ""` for never-saved drafts
fn deserialize_id<'de, D>(deserializer: D) -> Result<Option<MacroId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

impl MacroConfig {
    /// Unsaved macro with no actions, mode `Once`
    pub fn new(name: impl Into<String>, trigger: Trigger) -> Self {
        Self {
            id: None,
            name: name.into(),
            trigger,
            mode: ExecutionMode::Once,
            repeat_count: None,
            repeat_delay_ms: None,
            actions: Vec::new(),
        }
    }

    /// Default draft for a trigger that has no macro yet
    pub fn new_for_trigger(trigger: Trigger) -> Self {
        let name = format!("Macro {}", trigger.key);
        Self::new(name, trigger)
    }

    pub fn id(&self) -> Option<MacroId> {
        self.id
    }

    pub fn has_id(&self) -> bool {
        self.id.is_some()
    }

    /// Assign an identity if none exists yet; an existing one is kept
    pub fn ensure_id(&mut self) -> MacroId {
        *self.id.get_or_insert_with(MacroId::new)
    }

    /// Deep copy under a fresh identity, bound to `trigger`
    pub fn cloned_for(&self, trigger: Trigger, name: impl Into<String>) -> Self {
        Self {
            id: Some(MacroId::new()),
            name: name.into(),
            trigger,
            ..self.clone()
        }
    }

    pub fn push_action(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn remove_action(&mut self, index: usize) -> Option<Action> {
        if index < self.actions.len() {
            Some(self.actions.remove(index))
        } else {
            None
        }
    }

    /// Move the action at `from` so it ends up at `to`. Returns false if either index is out of range.
    pub fn move_action(&mut self, from: usize, to: usize) -> bool {
        let len = self.actions.len();
        if from >= len || to >= len {
            return false;
        }
        let action = self.actions.remove(from);
        self.actions.insert(to, action);
        true
    }

    pub fn set_action_delay(&mut self, index: usize, delay_ms: u32) -> bool {
        match self.actions.get_mut(index) {
            Some(action) => {
                action.set_delay_ms(delay_ms);
                true
            }
            None => false,
        }
    }

    /// Overwrite every action's delay
    pub fn apply_global_delay(&mut self, delay_ms: u32) {
        for action in &mut self.actions {
            action.set_delay_ms(delay_ms);
        }
    }

    /// Length of one pass in milliseconds
    pub fn total_duration_ms(&self) -> u64 {
        self.actions.iter().map(Action::duration_ms).sum()
    }

    /// Drop parameters the mode never reads
    pub fn normalize_parameters(&mut self) {
        if !self.mode.uses_repeat_count() {
            self.repeat_count = None;
        }
        if !self.mode.uses_repeat_delay() {
            self.repeat_delay_ms = None;
        }
    }
}
