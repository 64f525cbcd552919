// MacroX Validation
// Structural checks a macro must pass before it is persisted

use std::sync::LazyLock;

use regex::Regex;

use crate::mode::{ContractError, PlaybackPlan};
use crate::model::{MacroConfig, MacroId};

/// Characters a macro name may not contain: < > : " / \ | ? *
static FORBIDDEN_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("valid regex"));

/// Why a macro was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name and actions must not be empty")]
    EmptyFields,

    #[error("name contains one of < > : \" / \\ | ? *")]
    IllegalCharacters,

    #[error("another macro is already named {0:?}")]
    DuplicateName(String),

    #[error("invalid mode parameters: {0}")]
    InvalidParameters(#[from] ContractError),
}

pub fn has_forbidden_chars(name: &str) -> bool {
    FORBIDDEN_NAME_CHARS.is_match(name)
}

/// Replace every forbidden character with `_`
pub fn sanitize_name(name: &str) -> String {
    FORBIDDEN_NAME_CHARS.replace_all(name, "_").into_owned()
}

/// Case-insensitive comparison of trimmed names
pub fn names_collide(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Is `other` the same stored macro as `candidate`
fn same_macro(candidate: &MacroConfig, other: &MacroConfig) -> bool {
    candidate.id().is_some() && candidate.id() == other.id()
}

/// Check `candidate` against the stored macros.
///
/// Checks run in a fixed order and stop at the first failure: empty name,
/// forbidden characters, duplicate name (ignoring `candidate` itself),
/// empty action list, then mode parameters.
pub fn validate(candidate: &MacroConfig, existing: &[MacroConfig]) -> Result<(), ValidationError> {
    let name = candidate.name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyFields);
    }
    if has_forbidden_chars(name) {
        return Err(ValidationError::IllegalCharacters);
    }
    if let Some(other) = existing
        .iter()
        .find(|other| !same_macro(candidate, other) && names_collide(&other.name, name))
    {
        return Err(ValidationError::DuplicateName(other.name.clone()));
    }
    if candidate.actions.is_empty() {
        return Err(ValidationError::EmptyFields);
    }
    PlaybackPlan::for_macro(candidate)?;
    Ok(())
}

/// Validate, then give the candidate an identity if it has none
pub fn validate_and_assign(
    candidate: &mut MacroConfig,
    existing: &[MacroConfig],
) -> Result<MacroId, ValidationError> {
    validate(candidate, existing)?;
    Ok(candidate.ensure_id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::key::CanonicalKeyId;
    use crate::mode::ExecutionMode;
    use crate::trigger::Trigger;

    fn with_action(name: &str) -> MacroConfig {
        let mut m = MacroConfig::new(name, Trigger::unassigned());
        m.push_action(Action::KeyDown {
            key: CanonicalKeyId::new("KeyA"),
            delay_ms: 0,
        });
        m
    }

    #[test]
    fn test_accepts_trimmed_unique_name() {
        assert_eq!(validate(&with_action("  Combo  "), &[]), Ok(()));
    }

    #[test]
    fn test_rejects_empty_name() {
        assert_eq!(validate(&with_action("   "), &[]), Err(ValidationError::EmptyFields));
    }

    #[test]
    fn test_rejects_each_forbidden_char() {
        for c in ['<', '>', ':', '"', '/', '\\', '|', '?', '*'] {
            let name = format!("bad{}name", c);
            assert_eq!(
                validate(&with_action(&name), &[]),
                Err(ValidationError::IllegalCharacters),
                "accepted {:?}",
                name
            );
        }
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("a<b>c:d"), "a_b_c_d");
        assert_eq!(sanitize_name("plain name"), "plain name");
        assert!(!has_forbidden_chars(&sanitize_name(r#"<>:"/\|?*"#)));
    }

    #[test]
    fn test_rejects_case_insensitive_duplicate() {
        let mut stored = with_action("Combo");
        stored.ensure_id();
        let result = validate(&with_action("combo "), &[stored]);
        assert_eq!(result, Err(ValidationError::DuplicateName("Combo".into())));
    }

    #[test]
    fn test_own_name_is_not_a_duplicate() {
        let mut stored = with_action("Combo");
        stored.ensure_id();
        let mut edited = stored.clone();
        edited.name = "COMBO".into();
        assert_eq!(validate(&edited, &[stored]), Ok(()));
    }

    #[test]
    fn test_rejects_empty_actions() {
        let m = MacroConfig::new("Fine", Trigger::unassigned());
        assert_eq!(validate(&m, &[]), Err(ValidationError::EmptyFields));
    }

    #[test]
    fn test_check_order_name_before_actions() {
        let m = MacroConfig::new("a|b", Trigger::unassigned());
        assert_eq!(validate(&m, &[]), Err(ValidationError::IllegalCharacters));
    }

    #[test]
    fn test_rejects_bad_repeat_count() {
        let mut m = with_action("Loop");
        m.mode = ExecutionMode::Repeat;
        m.repeat_count = Some(0);
        assert!(matches!(
            validate(&m, &[]),
            Err(ValidationError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_assigns_identity_once() {
        let mut m = with_action("Combo");
        let id = validate_and_assign(&mut m, &[]).unwrap();
        assert_eq!(validate_and_assign(&mut m, &[]).unwrap(), id);

        let mut bad = MacroConfig::new("", Trigger::unassigned());
        assert!(validate_and_assign(&mut bad, &[]).is_err());
        assert!(bad.id().is_none());
    }
}
