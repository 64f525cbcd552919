// MacroX Action Type
// One timed primitive in a macro's action sequence

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::button::MouseButton;
use crate::key::CanonicalKeyId;

/// A recorded or authored input primitive.
///
/// `delay_ms` is the wait before this action, relative to the previous one.
/// The JSON form is tagged by `type` (`key_down`, `mouse_click`, ...). Key
/// actions also accept the older `value` field name on input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    KeyDown {
        #[serde(alias = "value")]
        key: CanonicalKeyId,
        delay_ms: u32,
    },
    KeyUp {
        #[serde(alias = "value")]
        key: CanonicalKeyId,
        delay_ms: u32,
    },
    MouseDown {
        button: MouseButton,
        delay_ms: u32,
    },
    MouseUp {
        button: MouseButton,
        delay_ms: u32,
    },
    MouseClick {
        button: MouseButton,
        delay_ms: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration_ms: Option<u32>,
    },
    MouseMove {
        x: i32,
        y: i32,
        delay_ms: u32,
    },
}

impl Action {
    pub fn delay_ms(&self) -> u32 {
        match self {
            Action::KeyDown { delay_ms, .. }
            | Action::KeyUp { delay_ms, .. }
            | Action::MouseDown { delay_ms, .. }
            | Action::MouseUp { delay_ms, .. }
            | Action::MouseClick { delay_ms, .. }
            | Action::MouseMove { delay_ms, .. } => *delay_ms,
        }
    }

    pub fn set_delay_ms(&mut self, value: u32) {
        match self {
            Action::KeyDown { delay_ms, .. }
            | Action::KeyUp { delay_ms, .. }
            | Action::MouseDown { delay_ms, .. }
            | Action::MouseUp { delay_ms, .. }
            | Action::MouseClick { delay_ms, .. }
            | Action::MouseMove { delay_ms, .. } => *delay_ms = value,
        }
    }

    /// Key touched by a keyboard action
    pub fn key(&self) -> Option<&CanonicalKeyId> {
        match self {
            Action::KeyDown { key, .. } | Action::KeyUp { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Button touched by a mouse press, release or click
    pub fn mouse_button(&self) -> Option<MouseButton> {
        match self {
            Action::MouseDown { button, .. }
            | Action::MouseUp { button, .. }
            | Action::MouseClick { button, .. } => Some(*button),
            _ => None,
        }
    }

    /// True for `MouseDown` and `MouseUp`
    pub fn is_mouse_button_transition(&self) -> bool {
        matches!(self, Action::MouseDown { .. } | Action::MouseUp { .. })
    }

    /// Time this action occupies during playback, delay included
    pub fn duration_ms(&self) -> u64 {
        let hold = match self {
            Action::MouseClick { duration_ms, .. } => duration_ms.unwrap_or(0),
            _ => 0,
        };
        u64::from(self.delay_ms()) + u64::from(hold)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::KeyDown { key, delay_ms } => write!(f, "+{} after {}ms", key, delay_ms),
            Action::KeyUp { key, delay_ms } => write!(f, "-{} after {}ms", key, delay_ms),
            Action::MouseDown { button, delay_ms } => {
                write!(f, "+mouse:{} after {}ms", button, delay_ms)
            }
            Action::MouseUp { button, delay_ms } => {
                write!(f, "-mouse:{} after {}ms", button, delay_ms)
            }
            Action::MouseClick {
                button,
                delay_ms,
                duration_ms,
            } => match duration_ms {
                Some(held) => write!(f, "click:{} ({}ms) after {}ms", button, held, delay_ms),
                None => write!(f, "click:{} after {}ms", button, delay_ms),
            },
            Action::MouseMove { x, y, delay_ms } => {
                write!(f, "move({}, {}) after {}ms", x, y, delay_ms)
            }
        }
    }
}

/// Stored delay between two timestamps; out-of-order timestamps give 0
pub fn clamp_delay(last_ms: u64, now_ms: u64) -> u32 {
    u32::try_from(now_ms.saturating_sub(last_ms)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_delay() {
        assert_eq!(clamp_delay(115, 100), 0);
        assert_eq!(clamp_delay(100, 100), 0);
        assert_eq!(clamp_delay(100, 220), 120);
        assert_eq!(clamp_delay(5, u64::MAX), u32::MAX);
        assert_eq!(clamp_delay(u64::MAX, 5), 0);
    }

    #[test]
    fn test_delay_accessors() {
        let mut action = Action::MouseMove {
            x: 10,
            y: -4,
            delay_ms: 30,
        };
        assert_eq!(action.delay_ms(), 30);
        action.set_delay_ms(75);
        assert_eq!(action.delay_ms(), 75);
    }

    #[test]
    fn test_json_shape() {
        let action = Action::KeyDown {
            key: CanonicalKeyId::new("KeyA"),
            delay_ms: 0,
        };
        let json = serde_json::to_string(&action).unwrap();
        assert_eq!(json, r#"{"type":"key_down","key":"A","delay_ms":0}"#);

        let click: Action =
            serde_json::from_str(r#"{"type":"mouse_click","button":"left","delay_ms":5}"#).unwrap();
        let legacy: Action =
            serde_json::from_str(r#"{"type":"key_up","value":"KeyQ","delay_ms":7}"#).unwrap();
        assert_eq!(legacy.key(), Some(&CanonicalKeyId::new("Q")));
        assert_eq!(
            click,
            Action::MouseClick {
                button: MouseButton::Left,
                delay_ms: 5,
                duration_ms: None
            }
        );
    }

    #[test]
    fn test_mouse_classification() {
        let down = Action::MouseDown {
            button: MouseButton::Right,
            delay_ms: 0,
        };
        let click = Action::MouseClick {
            button: MouseButton::Left,
            delay_ms: 0,
            duration_ms: Some(40),
        };
        assert!(down.is_mouse_button_transition());
        assert!(!click.is_mouse_button_transition());
        assert_eq!(click.mouse_button(), Some(MouseButton::Left));
        assert_eq!(click.duration_ms(), 40);
        assert_eq!(down.key(), None);
    }

    #[test]
    fn test_display() {
        let up = Action::KeyUp {
            key: CanonicalKeyId::new("ShiftLeft"),
            delay_ms: 12,
        };
        assert_eq!(up.to_string(), "-SHIFT after 12ms");
    }
}
