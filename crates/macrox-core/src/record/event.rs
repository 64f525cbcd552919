// MacroX Input Events
// Raw key and button events as delivered to a recording session

use std::fmt;

use smallvec::SmallVec;

/// Press state of a raw input event.
///
/// Matches the usual platform numbering: 0 released, 1 pressed, 2 auto-repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Transition {
    Release = 0,
    Press = 1,
    Repeat = 2,
}

impl Transition {
    /// PRESS or REPEAT
    pub fn is_pressed(self) -> bool {
        matches!(self, Transition::Press | Transition::Repeat)
    }

    pub fn is_repeat(self) -> bool {
        matches!(self, Transition::Repeat)
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Transition::Release),
            1 => Some(Transition::Press),
            2 => Some(Transition::Repeat),
            _ => None,
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Release => write!(f, "release"),
            Transition::Press => write!(f, "press"),
            Transition::Repeat => write!(f, "repeat"),
        }
    }
}

/// Source of an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    /// Keyboard key, by physical id (`KeyA`, `ControlRight`)
    Key { physical: String },
    /// Mouse button, by platform index (0 left, 1 middle, 2 right, 3 back, 4 forward)
    Button { index: u16 },
}

/// The four event classes a recording session listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventClass {
    KeyPress,
    KeyRelease,
    ButtonPress,
    ButtonRelease,
}

impl EventClass {
    pub const ALL: [EventClass; 4] = [
        EventClass::KeyPress,
        EventClass::KeyRelease,
        EventClass::ButtonPress,
        EventClass::ButtonRelease,
    ];

    pub fn is_keyboard(self) -> bool {
        matches!(self, EventClass::KeyPress | EventClass::KeyRelease)
    }
}

/// One raw input event.
///
/// `target_path` lists the ids of the UI elements the event was delivered
/// to, innermost first. It is empty for events that did not hit the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent {
    pub kind: InputKind,
    pub transition: Transition,
    pub timestamp_ms: u64,
    pub target_path: SmallVec<[String; 4]>,
}

impl InputEvent {
    pub fn key(physical: impl Into<String>, transition: Transition, timestamp_ms: u64) -> Self {
        Self {
            kind: InputKind::Key {
                physical: physical.into(),
            },
            transition,
            timestamp_ms,
            target_path: SmallVec::new(),
        }
    }

    pub fn button(index: u16, transition: Transition, timestamp_ms: u64) -> Self {
        Self {
            kind: InputKind::Button { index },
            transition,
            timestamp_ms,
            target_path: SmallVec::new(),
        }
    }

    /// Attach the UI element path the event was delivered to
    pub fn with_target<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_path = path.into_iter().map(Into::into).collect();
        self
    }

    pub fn class(&self) -> EventClass {
        let pressed = self.transition.is_pressed();
        match (&self.kind, pressed) {
            (InputKind::Key { .. }, true) => EventClass::KeyPress,
            (InputKind::Key { .. }, false) => EventClass::KeyRelease,
            (InputKind::Button { .. }, true) => EventClass::ButtonPress,
            (InputKind::Button { .. }, false) => EventClass::ButtonRelease,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_properties() {
        assert!(Transition::Press.is_pressed());
        assert!(Transition::Repeat.is_pressed());
        assert!(Transition::Repeat.is_repeat());
        assert!(!Transition::Release.is_pressed());
        assert_eq!(Transition::from_i32(2), Some(Transition::Repeat));
        assert_eq!(Transition::from_i32(7), None);
    }

    #[test]
    fn test_event_class() {
        assert_eq!(
            InputEvent::key("KeyA", Transition::Repeat, 0).class(),
            EventClass::KeyPress
        );
        assert_eq!(
            InputEvent::button(2, Transition::Release, 0).class(),
            EventClass::ButtonRelease
        );
        assert!(EventClass::KeyRelease.is_keyboard());
        assert!(!EventClass::ButtonPress.is_keyboard());
    }

    #[test]
    fn test_with_target() {
        let event = InputEvent::button(0, Transition::Press, 5).with_target(["stop", "toolbar"]);
        assert_eq!(event.target_path.len(), 2);
        assert_eq!(event.target_path[0], "stop");
    }
}
