// MacroX Keyboard Layouts
// Printed glyph per physical key position for each supported layout

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Keyboard layout used to render key labels.
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
pub enum Layout {
    #[default]
    Qwerty,
    Azerty,
    Qwertz,
}

impl Layout {
    fn column(self) -> usize {
        match self {
            Layout::Qwerty => 0,
            Layout::Azerty => 1,
            Layout::Qwertz => 2,
        }
    }
}

/// A layout-dependent key position.
///
/// `canonical` is the position's storage id; `labels` is indexed by layout
/// (qwerty, azerty, qwertz). Labels are unique within each layout.
#[derive(Debug, Clone, Copy)]
pub struct Position {
    pub physical: &'static str,
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    labels: [&'static str; 3],
}

impl Position {
    const fn new(
        physical: &'static str,
        canonical: &'static str,
        aliases: &'static [&'static str],
        labels: [&'static str; 3],
    ) -> Self {
        Self {
            physical,
            canonical,
            aliases,
            labels,
        }
    }

    /// Glyph printed on this position for `layout`
    pub fn label(&self, layout: Layout) -> &'static str {
        self.labels[layout.column()]
    }
}

const NONE: &[&str] = &[];

pub const POSITIONS: &[Position] = &[
    // Number row
    Position::new("Backquote", "BACKQUOTE", &["GRAVE"], ["`", "²", "^"]),
    Position::new("Digit1", "1", &["KEY_1"], ["1", "1", "1"]),
    Position::new("Digit2", "2", &["KEY_2"], ["2", "2", "2"]),
    Position::new("Digit3", "3", &["KEY_3"], ["3", "3", "3"]),
    Position::new("Digit4", "4", &["KEY_4"], ["4", "4", "4"]),
    Position::new("Digit5", "5", &["KEY_5"], ["5", "5", "5"]),
    Position::new("Digit6", "6", &["KEY_6"], ["6", "6", "6"]),
    Position::new("Digit7", "7", &["KEY_7"], ["7", "7", "7"]),
    Position::new("Digit8", "8", &["KEY_8"], ["8", "8", "8"]),
    Position::new("Digit9", "9", &["KEY_9"], ["9", "9", "9"]),
    Position::new("Digit0", "0", &["KEY_0"], ["0", "0", "0"]),
    Position::new("Minus", "MINUS", NONE, ["-", ")", "ß"]),
    Position::new("Equal", "EQUAL", NONE, ["=", "=", "´"]),
    // Top row
    Position::new("KeyQ", "Q", NONE, ["Q", "A", "Q"]),
    Position::new("KeyW", "W", NONE, ["W", "Z", "W"]),
    Position::new("KeyE", "E", NONE, ["E", "E", "E"]),
    Position::new("KeyR", "R", NONE, ["R", "R", "R"]),
    Position::new("KeyT", "T", NONE, ["T", "T", "T"]),
    Position::new("KeyY", "Y", NONE, ["Y", "Y", "Z"]),
    Position::new("KeyU", "U", NONE, ["U", "U", "U"]),
    Position::new("KeyI", "I", NONE, ["I", "I", "I"]),
    Position::new("KeyO", "O", NONE, ["O", "O", "O"]),
    Position::new("KeyP", "P", NONE, ["P", "P", "P"]),
    Position::new("BracketLeft", "BRACKETLEFT", &["LEFT_BRACE", "LEFTBRACKET"], ["[", "^", "Ü"]),
    Position::new("BracketRight", "BRACKETRIGHT", &["RIGHT_BRACE", "RIGHTBRACKET"], ["]", "$", "+"]),
    // Home row
    Position::new("KeyA", "A", NONE, ["A", "Q", "A"]),
    Position::new("KeyS", "S", NONE, ["S", "S", "S"]),
    Position::new("KeyD", "D", NONE, ["D", "D", "D"]),
    Position::new("KeyF", "F", NONE, ["F", "F", "F"]),
    Position::new("KeyG", "G", NONE, ["G", "G", "G"]),
    Position::new("KeyH", "H", NONE, ["H", "H", "H"]),
    Position::new("KeyJ", "J", NONE, ["J", "J", "J"]),
    Position::new("KeyK", "K", NONE, ["K", "K", "K"]),
    Position::new("KeyL", "L", NONE, ["L", "L", "L"]),
    Position::new("Semicolon", "SEMICOLON", NONE, [";", "M", "Ö"]),
    Position::new("Quote", "QUOTE", &["APOSTROPHE"], ["'", "Ù", "Ä"]),
    Position::new("Backslash", "BACKSLASH", NONE, ["\\", "*", "#"]),
    // Bottom row
    Position::new("IntlBackslash", "INTLBACKSLASH", &["KEY_102ND"], ["Intl \\", "<", "<"]),
    Position::new("KeyZ", "Z", NONE, ["Z", "W", "Y"]),
    Position::new("KeyX", "X", NONE, ["X", "X", "X"]),
    Position::new("KeyC", "C", NONE, ["C", "C", "C"]),
    Position::new("KeyV", "V", NONE, ["V", "V", "V"]),
    Position::new("KeyB", "B", NONE, ["B", "B", "B"]),
    Position::new("KeyN", "N", NONE, ["N", "N", "N"]),
    Position::new("KeyM", "M", NONE, ["M", ",", "M"]),
    Position::new("Comma", "COMMA", NONE, [",", ";", ","]),
    Position::new("Period", "PERIOD", &["DOT"], [".", ":", "."]),
    Position::new("Slash", "SLASH", NONE, ["/", "!", "-"]),
];

/// Find a position by canonical id
pub fn position_for_canonical(canonical: &str) -> Option<&'static Position> {
    POSITIONS.iter().find(|p| p.canonical == canonical)
}

/// Find a position by physical id or alias (case-insensitive)
pub fn position_for_physical(physical: &str) -> Option<&'static Position> {
    let upper = physical.trim().to_uppercase();
    POSITIONS.iter().find(|p| {
        p.physical.to_uppercase() == upper || p.aliases.contains(&upper.as_str())
    })
}

/// Find the position printed with exactly `label` on `layout`
pub fn position_for_label(label: &str, layout: Layout) -> Option<&'static Position> {
    POSITIONS.iter().find(|p| p.label(layout) == label)
}

/// Case-insensitive variant of [`position_for_label`], so typed lowercase letters still resolve
pub fn position_for_label_ignore_case(label: &str, layout: Layout) -> Option<&'static Position> {
    let lower = label.to_lowercase();
    POSITIONS
        .iter()
        .find(|p| p.label(layout).to_lowercase() == lower)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use strum::IntoEnumIterator;

    #[test]
    fn test_labels_unique_per_layout() {
        for layout in Layout::iter() {
            let mut seen = HashSet::new();
            for p in POSITIONS {
                assert!(
                    seen.insert(p.label(layout)),
                    "duplicate label {} on {}",
                    p.label(layout),
                    layout
                );
            }
        }
    }

    #[test]
    fn test_azerty_swaps() {
        assert_eq!(position_for_canonical("Q").unwrap().label(Layout::Azerty), "A");
        assert_eq!(position_for_canonical("A").unwrap().label(Layout::Azerty), "Q");
        assert_eq!(position_for_canonical("W").unwrap().label(Layout::Azerty), "Z");
        assert_eq!(position_for_canonical("SEMICOLON").unwrap().label(Layout::Azerty), "M");
    }

    #[test]
    fn test_qwertz_swaps() {
        assert_eq!(position_for_canonical("Y").unwrap().label(Layout::Qwertz), "Z");
        assert_eq!(position_for_canonical("Z").unwrap().label(Layout::Qwertz), "Y");
    }

    #[test]
    fn test_label_lookup() {
        assert_eq!(position_for_label("A", Layout::Azerty).unwrap().physical, "KeyQ");
        assert!(position_for_label("a", Layout::Azerty).is_none());
        assert_eq!(
            position_for_label_ignore_case("a", Layout::Azerty).unwrap().physical,
            "KeyQ"
        );
        assert_eq!(
            position_for_label_ignore_case("ü", Layout::Qwertz).unwrap().physical,
            "BracketLeft"
        );
        assert!(position_for_label("Enter", Layout::Qwerty).is_none());
    }

    #[test]
    fn test_layout_parse() {
        assert_eq!("AZERTY".parse::<Layout>(), Ok(Layout::Azerty));
        assert_eq!("qwertz".parse::<Layout>(), Ok(Layout::Qwertz));
        assert_eq!(Layout::default(), Layout::Qwerty);
    }
}
