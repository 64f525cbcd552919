// MacroX Modifier Tokens
// Collapses device-specific modifier names into one storage token per logical modifier

use std::fmt;

use strum_macros::EnumIter;

/// Logical keyboard modifier as stored in a macro.
///
/// Left and right variants share one token in storage. Live capture keeps the
/// raw physical id, so [`Side`] is still available while recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Modifier {
    Ctrl,
    Shift,
    Alt,
    AltGr,
    Win,
}

/// Physical side of a modifier key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

/// Uppercase aliases per modifier. The canonical token comes first.
const CTRL_ALIASES: &[&str] = &[
    "CTRL",
    "CONTROL",
    "CONTROLLEFT",
    "CONTROLRIGHT",
    "CTRLLEFT",
    "CTRLRIGHT",
    "LEFT_CTRL",
    "RIGHT_CTRL",
    "LCTRL",
    "RCTRL",
];
const SHIFT_ALIASES: &[&str] = &[
    "SHIFT",
    "SHIFTLEFT",
    "SHIFTRIGHT",
    "LEFT_SHIFT",
    "RIGHT_SHIFT",
    "LSHIFT",
    "RSHIFT",
];
const ALT_ALIASES: &[&str] = &["ALT", "ALTLEFT", "LEFT_ALT", "LALT", "OPTION", "OPT"];
const ALTGR_ALIASES: &[&str] = &["ALTGR", "ALTRIGHT", "ALTGRAPH", "RIGHT_ALT", "RALT"];
const WIN_ALIASES: &[&str] = &[
    "WIN",
    "META",
    "METALEFT",
    "METARIGHT",
    "LEFT_META",
    "RIGHT_META",
    "OSLEFT",
    "OSRIGHT",
    "SUPER",
    "CMD",
    "COMMAND",
    "LWIN",
    "RWIN",
];

impl Modifier {
    /// Canonical storage token
    pub fn token(self) -> &'static str {
        self.aliases()[0]
    }

    /// Display label, identical on every layout
    pub fn label(self) -> &'static str {
        match self {
            Modifier::Ctrl => "Ctrl",
            Modifier::Shift => "Shift",
            Modifier::Alt => "Alt",
            Modifier::AltGr => "AltGr",
            Modifier::Win => "Win",
        }
    }

    /// Physical id used when a canonical modifier has to be turned back into a key position
    pub fn representative_physical(self) -> &'static str {
        match self {
            Modifier::Ctrl => "ControlLeft",
            Modifier::Shift => "ShiftLeft",
            Modifier::Alt => "AltLeft",
            Modifier::AltGr => "AltRight",
            Modifier::Win => "MetaLeft",
        }
    }

    /// All accepted uppercase spellings
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Modifier::Ctrl => CTRL_ALIASES,
            Modifier::Shift => SHIFT_ALIASES,
            Modifier::Alt => ALT_ALIASES,
            Modifier::AltGr => ALTGR_ALIASES,
            Modifier::Win => WIN_ALIASES,
        }
    }

    /// Resolve any physical or alias spelling (case-insensitive)
    pub fn from_alias(name: &str) -> Option<Modifier> {
        use strum::IntoEnumIterator;

        let upper = name.trim().to_uppercase();
        Modifier::iter().find(|m| m.aliases().contains(&upper.as_str()))
    }

    /// Resolve a display label back to a modifier
    pub fn from_label(label: &str) -> Option<Modifier> {
        use strum::IntoEnumIterator;

        Modifier::iter().find(|m| m.label() == label)
    }

    /// Side of a physical modifier id, if the id names one
    pub fn side_of(physical: &str) -> Option<Side> {
        let upper = physical.trim().to_uppercase();
        Modifier::from_alias(&upper)?;
        if upper.ends_with("LEFT") || upper.starts_with("LEFT_") {
            return Some(Side::Left);
        }
        if upper.ends_with("RIGHT") || upper.starts_with("RIGHT_") {
            return Some(Side::Right);
        }
        match upper.as_bytes() {
            [b'L', rest @ ..] if !rest.is_empty() => Some(Side::Left),
            [b'R', rest @ ..] if !rest.is_empty() => Some(Side::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "Left"),
            Side::Right => write!(f, "Right"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_left_and_right_collapse() {
        assert_eq!(Modifier::from_alias("ControlLeft"), Some(Modifier::Ctrl));
        assert_eq!(Modifier::from_alias("ControlRight"), Some(Modifier::Ctrl));
        assert_eq!(Modifier::from_alias("ShiftRight"), Some(Modifier::Shift));
        assert_eq!(Modifier::from_alias("MetaRight"), Some(Modifier::Win));
    }

    #[test]
    fn test_alt_and_altgr_stay_distinct() {
        assert_eq!(Modifier::from_alias("AltLeft"), Some(Modifier::Alt));
        assert_eq!(Modifier::from_alias("AltRight"), Some(Modifier::AltGr));
        assert_eq!(Modifier::from_alias("AltGraph"), Some(Modifier::AltGr));
    }

    #[test]
    fn test_token_is_its_own_alias() {
        use strum::IntoEnumIterator;
        for m in Modifier::iter() {
            assert_eq!(Modifier::from_alias(m.token()), Some(m));
        }
    }

    #[test]
    fn test_side_of() {
        assert_eq!(Modifier::side_of("ShiftLeft"), Some(Side::Left));
        assert_eq!(Modifier::side_of("RIGHT_CTRL"), Some(Side::Right));
        assert_eq!(Modifier::side_of("RCtrl"), Some(Side::Right));
        assert_eq!(Modifier::side_of("CTRL"), None);
        assert_eq!(Modifier::side_of("KeyA"), None);
    }

    #[test]
    fn test_unknown_alias() {
        assert_eq!(Modifier::from_alias("Hyper"), None);
        assert_eq!(Modifier::from_alias("A"), None);
    }
}
