// MacroX Position Capture
// Single-shot pointer position capture for mouse-move actions

use smallvec::{smallvec, SmallVec};

use super::event::{InputEvent, InputKind, Transition};
use crate::action::Action;
use crate::backend::CursorProvider;
use crate::button::MouseButton;
use crate::key::{canonicalize, CanonicalKeyId};

const DEFAULT_CAPTURE_KEY: &str = "F";
const CANCEL_KEY: &str = "ESC";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionOutcome {
    /// `MouseMove` to the pointer followed by a left click
    Captured(SmallVec<[Action; 2]>),
    /// Escape pressed; capture disarmed
    Cancelled,
    /// The cursor could not be read; still armed
    Unavailable,
    /// Event is not the capture or cancel key
    Ignored,
    NotArmed,
}

/// Armed/disarmed state of the "capture position" affordance.
///
/// Continuous pointer movement is never recorded; each capture yields one
/// move and one click.
#[derive(Debug, Clone)]
pub struct PositionCapture {
    armed: bool,
    capture_key: CanonicalKeyId,
}

impl Default for PositionCapture {
    fn default() -> Self {
        Self {
            armed: false,
            capture_key: canonicalize(DEFAULT_CAPTURE_KEY),
        }
    }
}

impl PositionCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capture_key(physical: &str) -> Self {
        Self {
            armed: false,
            capture_key: canonicalize(physical),
        }
    }

    pub fn capture_key(&self) -> &CanonicalKeyId {
        &self.capture_key
    }

    pub fn arm(&mut self) {
        self.armed = true;
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// React to a key press while armed
    pub fn handle(
        &mut self,
        event: &InputEvent,
        cursor: &dyn CursorProvider,
        delay_ms: u32,
    ) -> PositionOutcome {
        if !self.armed {
            return PositionOutcome::NotArmed;
        }
        let InputKind::Key { physical } = &event.kind else {
            return PositionOutcome::Ignored;
        };
        if event.transition != Transition::Press {
            return PositionOutcome::Ignored;
        }

        let key = canonicalize(physical);
        if key == CANCEL_KEY {
            self.armed = false;
            return PositionOutcome::Cancelled;
        }
        if key != self.capture_key {
            return PositionOutcome::Ignored;
        }
        self.capture_now(cursor, delay_ms)
    }

    /// Capture immediately, as when the capture control is clicked
    pub fn capture_now(&mut self, cursor: &dyn CursorProvider, delay_ms: u32) -> PositionOutcome {
        match cursor.cursor_position() {
            Some((x, y)) => {
                self.armed = false;
                log::debug!("captured cursor at ({}, {})", x, y);
                PositionOutcome::Captured(smallvec![
                    Action::MouseMove { x, y, delay_ms },
                    Action::MouseClick {
                        button: MouseButton::Left,
                        delay_ms: 0,
                        duration_ms: None,
                    },
                ])
            }
            None => {
                log::warn!("cursor position unavailable");
                PositionOutcome::Unavailable
            }
        }
    }
}
