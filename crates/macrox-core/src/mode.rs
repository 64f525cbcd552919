// MacroX Execution Modes
// Replay policies, their parameter rules, and the trigger activation contract

use std::collections::HashSet;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::model::{MacroConfig, MacroId};

/// Legal `repeat_count` values for [`ExecutionMode::Repeat`]
pub const REPEAT_COUNT_RANGE: RangeInclusive<u32> = 1..=99;

/// Replay policy of a macro
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExecutionMode {
    /// Play the sequence once per activation
    #[default]
    Once,
    /// Play while the trigger is held, stop on release
    Hold,
    /// Start on one activation, stop on the next
    Toggle,
    /// Play `repeat_count` passes, then halt
    Repeat,
}

impl ExecutionMode {
    pub fn uses_repeat_count(self) -> bool {
        matches!(self, ExecutionMode::Repeat)
    }

    pub fn uses_repeat_delay(self) -> bool {
        !matches!(self, ExecutionMode::Once)
    }

    /// Whether the trigger event is consumed instead of reaching other applications
    pub fn swallows_trigger(self) -> bool {
        matches!(self, ExecutionMode::Hold | ExecutionMode::Toggle)
    }
}

/// Parameter errors for an execution mode
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    #[error("repeat count {0} is outside 1..=99")]
    RepeatCountOutOfRange(u32),
}

/// What a playback executor must do for one macro
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPlan {
    Once,
    Hold { pass_delay_ms: u32 },
    Toggle { pass_delay_ms: u32 },
    Repeat { count: u32, pass_delay_ms: u32 },
}

impl PlaybackPlan {
    /// Derive and check the plan for `config`.
    ///
    /// A missing `repeat_count` means one pass; a missing delay means none.
    /// Parameters the mode does not use are ignored.
    pub fn for_macro(config: &MacroConfig) -> Result<Self, ContractError> {
        let pass_delay_ms = config.repeat_delay_ms.unwrap_or(0);
        match config.mode {
            ExecutionMode::Once => Ok(PlaybackPlan::Once),
            ExecutionMode::Hold => Ok(PlaybackPlan::Hold { pass_delay_ms }),
            ExecutionMode::Toggle => Ok(PlaybackPlan::Toggle { pass_delay_ms }),
            ExecutionMode::Repeat => {
                let count = config.repeat_count.unwrap_or(1);
                if !REPEAT_COUNT_RANGE.contains(&count) {
                    return Err(ContractError::RepeatCountOutOfRange(count));
                }
                Ok(PlaybackPlan::Repeat {
                    count,
                    pass_delay_ms,
                })
            }
        }
    }

    /// Number of passes, `None` when the run is open-ended
    pub fn passes(&self) -> Option<u32> {
        match self {
            PlaybackPlan::Once => Some(1),
            PlaybackPlan::Repeat { count, .. } => Some(*count),
            PlaybackPlan::Hold { .. } | PlaybackPlan::Toggle { .. } => None,
        }
    }

    pub fn pass_delay_ms(&self) -> u32 {
        match self {
            PlaybackPlan::Once => 0,
            PlaybackPlan::Hold { pass_delay_ms }
            | PlaybackPlan::Toggle { pass_delay_ms }
            | PlaybackPlan::Repeat { pass_delay_ms, .. } => *pass_delay_ms,
        }
    }
}

/// Executor instruction for a trigger event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Begin a run
    Start,
    /// Signal the current run to stop after the action in flight
    Stop,
    /// Nothing to do
    Ignored,
}

/// Executor response to one trigger press or release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerResponse {
    pub activation: Activation,
    /// Consume the trigger event instead of passing it through
    pub swallow: bool,
}

impl TriggerResponse {
    fn new(activation: Activation, swallow: bool) -> Self {
        Self { activation, swallow }
    }
}

/// Tracks which macros are running so press/release events map onto the mode contract.
///
/// Once and Repeat runs finish by themselves; the executor calls
/// [`ActivationTracker::finished`] when they do.
#[derive(Debug, Default)]
pub struct ActivationTracker {
    active: HashSet<MacroId>,
}

impl ActivationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_press(&mut self, id: MacroId, mode: ExecutionMode) -> TriggerResponse {
        match mode {
            ExecutionMode::Once | ExecutionMode::Repeat => {
                self.active.insert(id);
                TriggerResponse::new(Activation::Start, false)
            }
            ExecutionMode::Hold => {
                if self.active.insert(id) {
                    TriggerResponse::new(Activation::Start, true)
                } else {
                    // auto-repeat of the held trigger
                    TriggerResponse::new(Activation::Ignored, true)
                }
            }
            ExecutionMode::Toggle => {
                if self.active.remove(&id) {
                    TriggerResponse::new(Activation::Stop, true)
                } else {
                    self.active.insert(id);
                    TriggerResponse::new(Activation::Start, true)
                }
            }
        }
    }

    pub fn on_release(&mut self, id: MacroId, mode: ExecutionMode) -> TriggerResponse {
        match mode {
            ExecutionMode::Hold => {
                if self.active.remove(&id) {
                    TriggerResponse::new(Activation::Stop, true)
                } else {
                    TriggerResponse::new(Activation::Ignored, true)
                }
            }
            ExecutionMode::Toggle => TriggerResponse::new(Activation::Ignored, true),
            ExecutionMode::Once | ExecutionMode::Repeat => {
                TriggerResponse::new(Activation::Ignored, false)
            }
        }
    }

    /// Mark a self-terminating run as done
    pub fn finished(&mut self, id: MacroId) {
        self.active.remove(&id);
    }

    /// Should the run for `id` keep going
    pub fn is_active(&self, id: MacroId) -> bool {
        self.active.contains(&id)
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}
