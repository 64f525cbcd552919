// MacroX Key Canonicalizer
// Maps physical input ids to layout-independent storage ids and display labels

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::button::MouseButton;
use crate::layout::{self, Layout};
use crate::modifier::Modifier;

/// Reserved trigger id meaning "no physical binding yet"
pub const UNASSIGNED: &str = "UNASSIGNED";

const UNASSIGNED_LABEL: &str = "Unassigned";

/// Layout-independent identifier of a physical key position or mouse button.
///
/// Deserializing goes through [`canonicalize`], so ids read from disk are
/// normalized the same way as live input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CanonicalKeyId(String);

impl CanonicalKeyId {
    /// Canonicalize `raw` into an id
    pub fn new(raw: &str) -> Self {
        canonicalize(raw)
    }

    pub fn unassigned() -> Self {
        CanonicalKeyId(UNASSIGNED.to_string())
    }

    pub fn is_unassigned(&self) -> bool {
        self.0 == UNASSIGNED
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the five canonical mouse button ids
    pub fn is_mouse(&self) -> bool {
        is_mouse_id(&self.0)
    }
}

impl fmt::Display for CanonicalKeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CanonicalKeyId {
    fn from(raw: String) -> Self {
        canonicalize(&raw)
    }
}

impl From<&str> for CanonicalKeyId {
    fn from(raw: &str) -> Self {
        canonicalize(raw)
    }
}

impl From<CanonicalKeyId> for String {
    fn from(id: CanonicalKeyId) -> Self {
        id.0
    }
}

impl PartialEq<str> for CanonicalKeyId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CanonicalKeyId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A key whose label does not depend on the layout
#[derive(Debug, Clone, Copy)]
pub struct FixedKey {
    pub canonical: &'static str,
    pub physical: &'static str,
    pub label: &'static str,
    pub aliases: &'static [&'static str],
}

const fn fixed(
    canonical: &'static str,
    physical: &'static str,
    label: &'static str,
    aliases: &'static [&'static str],
) -> FixedKey {
    FixedKey {
        canonical,
        physical,
        label,
        aliases,
    }
}

pub const FIXED_KEYS: &[FixedKey] = &[
    fixed("ESC", "Escape", "Esc", &["ESCAPE"]),
    fixed("ENTER", "Enter", "Enter", &["RETURN"]),
    fixed("TAB", "Tab", "Tab", &[]),
    fixed("BACKSPACE", "Backspace", "Backspace", &["BKSP"]),
    fixed("SPACE", "Space", "Space", &["SPACEBAR"]),
    fixed("CAPSLOCK", "CapsLock", "Caps", &["CAPS_LOCK", "CAPS"]),
    fixed("INSERT", "Insert", "Ins", &["INS"]),
    fixed("DELETE", "Delete", "Del", &["DEL"]),
    fixed("HOME", "Home", "Home", &[]),
    fixed("END", "End", "End", &[]),
    fixed("PAGEUP", "PageUp", "PgUp", &["PAGE_UP", "PGUP"]),
    fixed("PAGEDOWN", "PageDown", "PgDn", &["PAGE_DOWN", "PGDN"]),
    fixed("ARROWUP", "ArrowUp", "↑", &["UP", "UPARROW"]),
    fixed("ARROWDOWN", "ArrowDown", "↓", &["DOWN", "DOWNARROW"]),
    fixed("ARROWLEFT", "ArrowLeft", "←", &["LEFT", "LEFTARROW"]),
    fixed("ARROWRIGHT", "ArrowRight", "→", &["RIGHT", "RIGHTARROW"]),
    fixed("PRINTSCREEN", "PrintScreen", "PrtSc", &["PRINT", "SYSRQ"]),
    fixed("SCROLLLOCK", "ScrollLock", "ScrLk", &["SCROLL_LOCK"]),
    fixed("PAUSE", "Pause", "Pause", &["BREAK"]),
    fixed("NUMLOCK", "NumLock", "NumLk", &["NUM_LOCK"]),
    fixed("CONTEXTMENU", "ContextMenu", "Menu", &["MENU", "APPS"]),
    fixed("FN", "Fn", "Fn", &["FUNCTION"]),
    fixed("F1", "F1", "F1", &[]),
    fixed("F2", "F2", "F2", &[]),
    fixed("F3", "F3", "F3", &[]),
    fixed("F4", "F4", "F4", &[]),
    fixed("F5", "F5", "F5", &[]),
    fixed("F6", "F6", "F6", &[]),
    fixed("F7", "F7", "F7", &[]),
    fixed("F8", "F8", "F8", &[]),
    fixed("F9", "F9", "F9", &[]),
    fixed("F10", "F10", "F10", &[]),
    fixed("F11", "F11", "F11", &[]),
    fixed("F12", "F12", "F12", &[]),
    fixed("NUMPAD0", "Numpad0", "Num 0", &["KP0"]),
    fixed("NUMPAD1", "Numpad1", "Num 1", &["KP1"]),
    fixed("NUMPAD2", "Numpad2", "Num 2", &["KP2"]),
    fixed("NUMPAD3", "Numpad3", "Num 3", &["KP3"]),
    fixed("NUMPAD4", "Numpad4", "Num 4", &["KP4"]),
    fixed("NUMPAD5", "Numpad5", "Num 5", &["KP5"]),
    fixed("NUMPAD6", "Numpad6", "Num 6", &["KP6"]),
    fixed("NUMPAD7", "Numpad7", "Num 7", &["KP7"]),
    fixed("NUMPAD8", "Numpad8", "Num 8", &["KP8"]),
    fixed("NUMPAD9", "Numpad9", "Num 9", &["KP9"]),
    fixed("NUMPADADD", "NumpadAdd", "Num +", &["KPPLUS"]),
    fixed("NUMPADSUBTRACT", "NumpadSubtract", "Num -", &["KPMINUS"]),
    fixed("NUMPADMULTIPLY", "NumpadMultiply", "Num *", &["KPASTERISK", "KPMULTIPLY"]),
    fixed("NUMPADDIVIDE", "NumpadDivide", "Num /", &["KPSLASH", "KPDIVIDE"]),
    fixed("NUMPADDECIMAL", "NumpadDecimal", "Num .", &["KPDOT", "KPDELETE"]),
    fixed("NUMPADENTER", "NumpadEnter", "Num Enter", &["KPENTER", "KPRETURN"]),
];

fn fixed_by_canonical(canonical: &str) -> Option<&'static FixedKey> {
    FIXED_KEYS.iter().find(|k| k.canonical == canonical)
}

/// Look up a fixed key by any uppercase spelling
fn fixed_by_name(upper: &str) -> Option<&'static FixedKey> {
    FIXED_KEYS.iter().find(|k| {
        k.canonical == upper || k.physical.to_uppercase() == upper || k.aliases.contains(&upper)
    })
}

fn fixed_by_label(label: &str) -> Option<&'static FixedKey> {
    FIXED_KEYS.iter().find(|k| k.label == label)
}

/// Collapse a physical input id into its canonical storage form.
///
/// Handles browser-style codes (`KeyA`, `Digit1`, `ControlRight`), evdev-style
/// names (`LEFT_CTRL`, `KEY_1`, `DOT`), hook-style names (`Num1`, `KpReturn`,
/// `LeftBracket`) and mouse ids (`MouseButton3`, `MouseX1`). Unknown ids pass through trimmed and uppercased; this never
/// fails. Idempotent.
pub fn canonicalize(physical: &str) -> CanonicalKeyId {
    let upper = physical.trim().to_uppercase();

    if upper == UNASSIGNED {
        return CanonicalKeyId::unassigned();
    }
    if let Some(modifier) = Modifier::from_alias(&upper) {
        return CanonicalKeyId(modifier.token().to_string());
    }
    if let Some(button) = MouseButton::from_physical(&upper) {
        return CanonicalKeyId(button.canonical_id().to_string());
    }
    if let Some(letter) = single_char_after(&upper, "KEY", |c| c.is_ascii_uppercase()) {
        return CanonicalKeyId(letter);
    }
    if let Some(digit) = single_char_after(&upper, "DIGIT", |c| c.is_ascii_digit()) {
        return CanonicalKeyId(digit);
    }
    if let Some(digit) = single_char_after(&upper, "NUM", |c| c.is_ascii_digit()) {
        return CanonicalKeyId(digit);
    }
    if let Some(position) = layout::position_for_physical(&upper) {
        return CanonicalKeyId(position.canonical.to_string());
    }
    if let Some(key) = fixed_by_name(&upper) {
        return CanonicalKeyId(key.canonical.to_string());
    }

    log::trace!("passing through unknown key id {:?}", upper);
    CanonicalKeyId(upper)
}

fn single_char_after(upper: &str, prefix: &str, accept: impl Fn(char) -> bool) -> Option<String> {
    let rest = upper.strip_prefix(prefix)?;
    let mut chars = rest.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if accept(c) => Some(c.to_string()),
        _ => None,
    }
}

/// Display label for a canonical id on `layout`.
///
/// Unknown ids are shown raw, or bracketed (`[Ü]`) when the raw text would
/// read back as a known label on `layout`.
pub fn label(canonical: &CanonicalKeyId, layout: Layout) -> String {
    let id = canonical.as_str();
    if canonical.is_unassigned() {
        return UNASSIGNED_LABEL.to_string();
    }
    if let Some(position) = layout::position_for_canonical(id) {
        return position.label(layout).to_string();
    }
    if let Some(modifier) = Modifier::from_alias(id) {
        return modifier.label().to_string();
    }
    if let Some(button) = MouseButton::from_physical(id) {
        return button.label().to_string();
    }
    if let Some(key) = fixed_by_canonical(id) {
        return key.label.to_string();
    }
    if unescape(id).is_some() || label_to_physical(id, layout).is_some() {
        return format!("[{}]", id);
    }
    id.to_string()
}

fn unescape(label: &str) -> Option<&str> {
    label
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .filter(|inner| !inner.is_empty())
}

/// Label for a live event, keeping the modifier side that storage drops
pub fn live_label(physical: &str, layout: Layout) -> String {
    let canonical = canonicalize(physical);
    match (Modifier::from_alias(physical), Modifier::side_of(physical)) {
        (Some(Modifier::AltGr), _) | (Some(_), None) | (None, _) => label(&canonical, layout),
        (Some(modifier), Some(side)) => format!("{} {}", side, modifier.label()),
    }
}

/// Representative physical id for a canonical id (`Q` -> `KeyQ`, `CTRL` -> `ControlLeft`)
pub fn to_physical(canonical: &CanonicalKeyId) -> String {
    let id = canonical.as_str();
    if let Some(position) = layout::position_for_canonical(id) {
        return position.physical.to_string();
    }
    if let Some(modifier) = Modifier::from_alias(id) {
        return modifier.representative_physical().to_string();
    }
    if let Some(button) = MouseButton::from_physical(id) {
        return button.physical_id().to_string();
    }
    if let Some(key) = fixed_by_canonical(id) {
        return key.physical.to_string();
    }
    id.to_string()
}

/// Resolve a display label on `layout` back to a physical id.
///
/// Exact glyph matches win over case-insensitive ones. A bracketed label is
/// an unknown id shown verbatim. Text that matches no label is treated as an
/// id and resolved through [`canonicalize`].
pub fn display_to_physical(label: &str, layout: Layout) -> String {
    if let Some(raw) = unescape(label) {
        return raw.to_string();
    }
    label_to_physical(label, layout).unwrap_or_else(|| to_physical(&canonicalize(label)))
}

fn label_to_physical(label: &str, layout: Layout) -> Option<String> {
    if let Some(position) = layout::position_for_label(label, layout) {
        return Some(position.physical.to_string());
    }
    if let Some(physical) = fixed_label_to_physical(label) {
        return Some(physical.to_string());
    }
    if label == UNASSIGNED_LABEL {
        return Some(UNASSIGNED.to_string());
    }
    if let Some(position) = layout::position_for_label_ignore_case(label, layout) {
        return Some(position.physical.to_string());
    }
    let lower = label.to_lowercase();
    FIXED_KEYS
        .iter()
        .find(|k| k.label.to_lowercase() == lower)
        .and_then(|k| fixed_label_to_physical(k.label))
        .map(str::to_string)
}

fn fixed_label_to_physical(label: &str) -> Option<&'static str> {
    if let Some(modifier) = Modifier::from_label(label) {
        return Some(modifier.representative_physical());
    }
    if let Some(button) = MouseButton::from_label(label) {
        return Some(button.physical_id());
    }
    fixed_by_label(label).map(|k| k.physical)
}

/// True for the five canonical mouse button ids
pub fn is_mouse_id(canonical: &str) -> bool {
    canonical.starts_with("MOUSE_") && MouseButton::from_physical(canonical).is_some()
}

/// Every physical id the tables know about, in table order
pub fn known_physical_ids() -> Vec<&'static str> {
    use strum::IntoEnumIterator;

    let mut ids: Vec<&'static str> = layout::POSITIONS.iter().map(|p| p.physical).collect();
    ids.extend(FIXED_KEYS.iter().map(|k| k.physical));
    for modifier in Modifier::iter() {
        ids.push(modifier.representative_physical());
    }
    ids.extend(["ControlRight", "ShiftRight", "MetaRight"]);
    ids.extend(MouseButton::iter().map(MouseButton::physical_id));
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use strum::IntoEnumIterator;

    #[test]
    fn test_canonicalize_positions() {
        assert_eq!(canonicalize("KeyA"), "A");
        assert_eq!(canonicalize("keya"), "A");
        assert_eq!(canonicalize("Digit1"), "1");
        assert_eq!(canonicalize("KEY_1"), "1");
        assert_eq!(canonicalize("Semicolon"), "SEMICOLON");
        assert_eq!(canonicalize("DOT"), "PERIOD");
        assert_eq!(canonicalize("GRAVE"), "BACKQUOTE");
    }

    #[test]
    fn test_canonicalize_modifiers() {
        assert_eq!(canonicalize("ControlLeft"), "CTRL");
        assert_eq!(canonicalize("ControlRight"), "CTRL");
        assert_eq!(canonicalize("AltLeft"), "ALT");
        assert_eq!(canonicalize("AltRight"), "ALTGR");
        assert_eq!(canonicalize("MetaLeft"), "WIN");
    }

    #[test]
    fn test_canonicalize_mouse() {
        assert_eq!(canonicalize("MouseLeft"), "MOUSE_LEFT");
        assert_eq!(canonicalize("MouseButton3"), "MOUSE_MIDDLE");
        assert_eq!(canonicalize("MouseX1"), "MOUSE_BACK");
        assert!(canonicalize("MouseX2").is_mouse());
    }

    #[test]
    fn test_canonicalize_fixed_keys() {
        assert_eq!(canonicalize("Escape"), "ESC");
        assert_eq!(canonicalize("Return"), "ENTER");
        assert_eq!(canonicalize("ArrowUp"), "ARROWUP");
        assert_eq!(canonicalize("PAGE_DOWN"), "PAGEDOWN");
        assert_eq!(canonicalize("Numpad5"), "NUMPAD5");
    }

    #[test]
    fn test_unknown_passthrough() {
        assert_eq!(canonicalize("  LaunchMail "), "LAUNCHMAIL");
        assert_eq!(canonicalize("unassigned"), UNASSIGNED);
        assert!(canonicalize("unassigned").is_unassigned());
    }

    #[test]
    fn test_canonicalize_idempotent() {
        let mut inputs = known_physical_ids();
        inputs.extend(["LEFT_CTRL", "KP7", "mouse_forward", "Weird Key", "", "Fn"]);
        for input in inputs {
            let once = canonicalize(input);
            assert_eq!(canonicalize(once.as_str()), once, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_label_per_layout() {
        let q = canonicalize("KeyQ");
        assert_eq!(label(&q, Layout::Qwerty), "Q");
        assert_eq!(label(&q, Layout::Azerty), "A");
        assert_eq!(label(&canonicalize("ControlRight"), Layout::Qwertz), "Ctrl");
        assert_eq!(label(&canonicalize("MouseButton2"), Layout::Qwerty), "Mouse Right");
        assert_eq!(label(&CanonicalKeyId::unassigned(), Layout::Qwerty), "Unassigned");
        assert_eq!(label(&canonicalize("LaunchMail"), Layout::Qwerty), "LAUNCHMAIL");
    }

    #[test]
    fn test_live_label_keeps_side() {
        assert_eq!(live_label("ControlRight", Layout::Qwerty), "Right Ctrl");
        assert_eq!(live_label("ShiftLeft", Layout::Qwerty), "Left Shift");
        assert_eq!(live_label("AltRight", Layout::Qwerty), "AltGr");
        assert_eq!(live_label("KeyW", Layout::Azerty), "Z");
    }

    #[test]
    fn test_display_to_physical() {
        assert_eq!(display_to_physical("A", Layout::Azerty), "KeyQ");
        assert_eq!(display_to_physical("a", Layout::Azerty), "KeyQ");
        assert_eq!(display_to_physical("Esc", Layout::Qwerty), "Escape");
        assert_eq!(display_to_physical("esc", Layout::Qwerty), "Escape");
        assert_eq!(display_to_physical("Ctrl", Layout::Qwerty), "ControlLeft");
        assert_eq!(display_to_physical("Unassigned", Layout::Qwerty), UNASSIGNED);
        assert_eq!(display_to_physical("LAUNCHMAIL", Layout::Qwerty), "LAUNCHMAIL");
    }

    #[test]
    fn test_hook_names_match_browser_codes() {
        let pairs = [
            ("Num1", "Digit1"),
            ("Num0", "Digit0"),
            ("LeftBracket", "BracketLeft"),
            ("RightBracket", "BracketRight"),
            ("KpReturn", "NumpadEnter"),
            ("KpDelete", "NumpadDecimal"),
            ("KpMultiply", "NumpadMultiply"),
            ("KpDivide", "NumpadDivide"),
            ("KpMinus", "NumpadSubtract"),
            ("Kp7", "Numpad7"),
            ("Function", "Fn"),
            ("BackQuote", "Backquote"),
            ("SemiColon", "Semicolon"),
            ("UpArrow", "ArrowUp"),
        ];
        for (hook, browser) in pairs {
            assert_eq!(canonicalize(hook), canonicalize(browser), "{} vs {}", hook, browser);
        }
        // longer NUM names stay on their own keys
        assert_eq!(canonicalize("Numpad7"), "NUMPAD7");
        assert_eq!(canonicalize("NumLock"), "NUMLOCK");
        assert_eq!(canonicalize("Num12"), "NUM12");
    }

    #[test]
    fn test_passthrough_labels_round_trip() {
        for layout in Layout::iter() {
            for raw in ["ü", "²", "ß", "´", "é", "^", "mystery_key", "Num Enter", "[x]", "[]"] {
                let id = canonicalize(raw);
                let shown = label(&id, layout);
                let back = display_to_physical(&shown, layout);
                assert_eq!(canonicalize(&back), id, "{:?} on {} shown as {:?}", raw, layout, shown);
            }
        }
        assert_eq!(label(&canonicalize("ü"), Layout::Qwertz), "[Ü]");
        assert_eq!(label(&canonicalize("ü"), Layout::Qwerty), "Ü");
        assert_eq!(label(&canonicalize("²"), Layout::Azerty), "[²]");
        assert_eq!(display_to_physical("[Ü]", Layout::Qwertz), "Ü");
        assert_eq!(display_to_physical("Ü", Layout::Qwertz), "BracketLeft");
    }

    #[test]
    fn test_to_physical() {
        assert_eq!(to_physical(&canonicalize("Q")), "KeyQ");
        assert_eq!(to_physical(&canonicalize("CTRL")), "ControlLeft");
        assert_eq!(to_physical(&canonicalize("MOUSE_BACK")), "MouseBack");
        assert_eq!(to_physical(&canonicalize("ESC")), "Escape");
    }

    #[test]
    fn test_labels_unique_across_tables() {
        for layout in Layout::iter() {
            let mut seen = HashSet::new();
            let canonicals: HashSet<CanonicalKeyId> =
                known_physical_ids().into_iter().map(canonicalize).collect();
            for id in canonicals {
                let text = label(&id, layout);
                assert!(seen.insert(text.clone()), "label {:?} reused on {}", text, layout);
            }
        }
    }

    #[test]
    fn test_serde_canonicalizes() {
        let id: CanonicalKeyId = serde_json::from_str("\"ControlRight\"").unwrap();
        assert_eq!(id, "CTRL");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"CTRL\"");
    }
}
