// MacroX Mouse Buttons
// Fixed five-way button model shared by triggers and recorded actions

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// A mouse button as stored in a macro.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
}

impl MouseButton {
    /// Map the platform's numeric button index.
    ///
    /// Index order is left, middle, right, back, forward: index 1 is the
    /// wheel button even though `Middle` sits third in the enum. Unknown
    /// indices fall back to `Left`.
    pub fn from_index(index: u16) -> Self {
        match index {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            3 => MouseButton::Back,
            4 => MouseButton::Forward,
            other => {
                log::debug!("unknown mouse button index {}, treating as left", other);
                MouseButton::Left
            }
        }
    }

    /// Inverse of [`MouseButton::from_index`]
    pub fn index(self) -> u16 {
        match self {
            MouseButton::Left => 0,
            MouseButton::Middle => 1,
            MouseButton::Right => 2,
            MouseButton::Back => 3,
            MouseButton::Forward => 4,
        }
    }

    /// Canonical trigger id for this button
    pub fn canonical_id(self) -> &'static str {
        match self {
            MouseButton::Left => "MOUSE_LEFT",
            MouseButton::Right => "MOUSE_RIGHT",
            MouseButton::Middle => "MOUSE_MIDDLE",
            MouseButton::Back => "MOUSE_BACK",
            MouseButton::Forward => "MOUSE_FORWARD",
        }
    }

    /// Representative physical id
    pub fn physical_id(self) -> &'static str {
        match self {
            MouseButton::Left => "MouseLeft",
            MouseButton::Right => "MouseRight",
            MouseButton::Middle => "MouseMiddle",
            MouseButton::Back => "MouseBack",
            MouseButton::Forward => "MouseForward",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MouseButton::Left => "Mouse Left",
            MouseButton::Right => "Mouse Right",
            MouseButton::Middle => "Mouse Middle",
            MouseButton::Back => "Mouse Back",
            MouseButton::Forward => "Mouse Forward",
        }
    }

    /// Parse a physical mouse id such as `MouseLeft`, `MouseButton3`, `MouseX1` or `MOUSE_BACK`.
    ///
    /// Numbered ids count from 1 (`MouseButton1` is the left button).
    pub fn from_physical(physical: &str) -> Option<Self> {
        let upper = physical.trim().to_uppercase();
        let rest = upper.strip_prefix("MOUSE")?;
        let rest = rest.trim_start_matches('_');
        let rest = rest.strip_prefix("BUTTON").unwrap_or(rest);
        let rest = rest.trim_start_matches('_');
        match rest {
            "LEFT" | "1" => Some(MouseButton::Left),
            "RIGHT" | "2" => Some(MouseButton::Right),
            "MIDDLE" | "3" => Some(MouseButton::Middle),
            "BACK" | "X1" | "4" => Some(MouseButton::Back),
            "FORWARD" | "X2" | "5" => Some(MouseButton::Forward),
            _ => None,
        }
    }

    /// Resolve a display label back to a button
    pub fn from_label(label: &str) -> Option<Self> {
        use strum::IntoEnumIterator;

        MouseButton::iter().find(|b| b.label() == label)
    }
}
