// MacroX Recording Session
// Turns a live input stream into a timed action sequence

use std::collections::HashSet;
use std::sync::Arc;

use smallvec::SmallVec;

use super::event::{EventClass, InputEvent, InputKind};
use super::hub::{CapturePhase, InputHub, Subscription};
use crate::action::{clamp_delay, Action};
use crate::button::MouseButton;
use crate::key::canonicalize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Recording,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordingError {
    #[error("a recording session is already active")]
    AlreadyRecording,

    #[error("no recording session is active")]
    NotRecording,
}

/// What `stop` does with the tail of the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cleanup {
    /// Drop the click that stopped the recording
    #[default]
    TrailingClick,
    /// Keep every recorded action
    Keep,
}

/// Result of feeding one event to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Captured {
    /// Appended as this action
    Appended(Action),
    /// Delivered to a control flagged as ignored
    IgnoredTarget,
    /// Key auto-repeat
    Repeat,
    /// The session is idle
    Idle,
}

/// Actions removed by the stop cleanup pass
pub type Trimmed = SmallVec<[Action; 2]>;

/// `Idle -> Recording -> Idle` capture state machine.
///
/// While recording it holds a [`Subscription`] to the four key and button
/// event classes; the subscription is released on stop or when the session
/// is dropped.
#[derive(Debug, Default)]
pub struct RecordingSession {
    state: SessionState,
    buffer: Vec<Action>,
    started_ms: u64,
    last_event_ms: u64,
    ignored: HashSet<String>,
    subscription: Option<Subscription>,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag a UI element whose events are never recorded (the stop button, other chrome)
    pub fn ignore_element(&mut self, id: impl Into<String>) {
        self.ignored.insert(id.into());
    }

    pub fn is_ignored(&self, event: &InputEvent) -> bool {
        event.target_path.iter().any(|id| self.ignored.contains(id))
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == SessionState::Recording
    }

    pub fn started_ms(&self) -> u64 {
        self.started_ms
    }

    /// Clear the buffer and start listening at `now_ms`
    pub fn start(&mut self, hub: Arc<dyn InputHub>, now_ms: u64) -> Result<(), RecordingError> {
        if self.is_recording() {
            return Err(RecordingError::AlreadyRecording);
        }
        self.buffer.clear();
        self.started_ms = now_ms;
        self.last_event_ms = now_ms;
        self.subscription = Some(Subscription::new(
            hub,
            &EventClass::ALL,
            CapturePhase::Capture,
        ));
        self.state = SessionState::Recording;
        log::debug!("recording started at {}ms", now_ms);
        Ok(())
    }

    /// Record one event.
    ///
    /// Ignored-target events and key auto-repeats are dropped before timing,
    /// so they never shift the delay of the next recorded action.
    pub fn handle(&mut self, event: &InputEvent) -> Captured {
        if !self.is_recording() {
            return Captured::Idle;
        }
        if self.is_ignored(event) {
            log::trace!("recording: dropped event on ignored target {:?}", event.target_path);
            return Captured::IgnoredTarget;
        }
        if event.transition.is_repeat() {
            return Captured::Repeat;
        }

        let delay_ms = clamp_delay(self.last_event_ms, event.timestamp_ms);
        self.last_event_ms = event.timestamp_ms;

        let pressed = event.transition.is_pressed();
        let action = match &event.kind {
            InputKind::Key { physical } => {
                let key = canonicalize(physical);
                if pressed {
                    Action::KeyDown { key, delay_ms }
                } else {
                    Action::KeyUp { key, delay_ms }
                }
            }
            InputKind::Button { index } => {
                let button = MouseButton::from_index(*index);
                if pressed {
                    Action::MouseDown { button, delay_ms }
                } else {
                    Action::MouseUp { button, delay_ms }
                }
            }
        };
        self.buffer.push(action.clone());
        Captured::Appended(action)
    }

    /// Stop and drop the click that ended the recording
    pub fn stop(&mut self) -> Result<Trimmed, RecordingError> {
        self.stop_with(Cleanup::TrailingClick)
    }

    pub fn stop_with(&mut self, cleanup: Cleanup) -> Result<Trimmed, RecordingError> {
        if !self.is_recording() {
            return Err(RecordingError::NotRecording);
        }
        self.state = SessionState::Idle;
        self.subscription = None;
        let trimmed = match cleanup {
            Cleanup::TrailingClick => trim_trailing_click(&mut self.buffer),
            Cleanup::Keep => Trimmed::new(),
        };
        log::debug!(
            "recording stopped: {} actions kept, {} trimmed",
            self.buffer.len(),
            trimmed.len()
        );
        Ok(trimmed)
    }

    pub fn actions(&self) -> &[Action] {
        &self.buffer
    }

    /// Move the recorded actions out, leaving the buffer empty
    pub fn take_actions(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.buffer)
    }
}

/// Remove at most one trailing mouse press/release.
///
/// A same-button down/up pair at the end goes as a pair; otherwise a lone
/// trailing mouse transition goes by itself.
fn trim_trailing_click(buffer: &mut Vec<Action>) -> Trimmed {
    let n = buffer.len();
    if n >= 2 {
        if let (Action::MouseDown { button: down, .. }, Action::MouseUp { button: up, .. }) =
            (&buffer[n - 2], &buffer[n - 1])
        {
            if down == up {
                return buffer.drain(n - 2..).collect();
            }
        }
    }
    match buffer.last() {
        Some(last) if last.is_mouse_button_transition() => buffer.pop().into_iter().collect(),
        _ => Trimmed::new(),
    }
}
