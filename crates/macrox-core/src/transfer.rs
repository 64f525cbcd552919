// MacroX Transfer Codec
// Export and import of single macros as base64-wrapped JSON

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::model::MacroConfig;

/// Most actions an imported macro may carry
pub const MAX_ACTIONS: usize = 1000;

/// Longest per-action delay an imported macro may carry
pub const MAX_DELAY_MS: u32 = 30_000;

#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("malformed macro: {0}")]
    Json(#[from] serde_json::Error),

    #[error("imported macro has no {0}")]
    MissingField(&'static str),

    #[error("imported macro has {0} actions, limit is 1000")]
    TooManyActions(usize),

    #[error("action {index} waits {delay_ms}ms, limit is 30000ms")]
    DelayTooLong { index: usize, delay_ms: u32 },
}

/// Encode a macro for sharing
pub fn encode(config: &MacroConfig) -> Result<String, TransferError> {
    let json = serde_json::to_string(config)?;
    Ok(STANDARD.encode(json))
}

/// Decode and check a shared macro.
///
/// A macro without an id gets a fresh one; the trigger and actions are
/// canonicalized on the way in.
pub fn decode(blob: &str) -> Result<MacroConfig, TransferError> {
    let bytes = STANDARD.decode(blob.trim())?;
    let json = String::from_utf8(bytes)?;
    let mut config: MacroConfig = serde_json::from_str(&json)?;
    check_limits(&config)?;
    config.ensure_id();
    Ok(config)
}

/// Reject imports that are empty or oversized
pub fn check_limits(config: &MacroConfig) -> Result<(), TransferError> {
    if config.name.trim().is_empty() {
        return Err(TransferError::MissingField("name"));
    }
    if config.trigger.key.as_str().is_empty() {
        return Err(TransferError::MissingField("trigger"));
    }
    if config.actions.is_empty() {
        return Err(TransferError::MissingField("actions"));
    }
    if config.actions.len() > MAX_ACTIONS {
        return Err(TransferError::TooManyActions(config.actions.len()));
    }
    if let Some((index, action)) = config
        .actions
        .iter()
        .enumerate()
        .find(|(_, a)| a.delay_ms() > MAX_DELAY_MS)
    {
        return Err(TransferError::DelayTooLong {
            index,
            delay_ms: action.delay_ms(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::key::CanonicalKeyId;
    use crate::trigger::Trigger;

    fn sample() -> MacroConfig {
        let mut m = MacroConfig::new("Combo", Trigger::from_physical("KeyQ"));
        m.push_action(Action::KeyDown {
            key: CanonicalKeyId::new("KeyA"),
            delay_ms: 0,
        });
        m.ensure_id();
        m
    }

    #[test]
    fn test_encode_decode_keeps_identity() {
        let m = sample();
        let blob = encode(&m).unwrap();
        assert_eq!(decode(&blob).unwrap(), m);
    }

    #[test]
    fn test_decode_assigns_missing_id() {
        let json = r#"{"name":"X","trigger":{"device":"keyboard","key":"F3"},"mode":"once",
            "actions":[{"type":"key_down","key":"KeyA","delay_ms":5}]}"#;
        let decoded = decode(&STANDARD.encode(json)).unwrap();
        assert!(decoded.id().is_some());
        assert_eq!(decoded.trigger.key, "F3");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(decode("%%%"), Err(TransferError::Base64(_))));
        assert!(matches!(
            decode(&STANDARD.encode("{not json")),
            Err(TransferError::Json(_))
        ));
    }

    #[test]
    fn test_rejects_empty_actions() {
        let mut m = sample();
        m.actions.clear();
        let blob = encode(&m).unwrap();
        assert!(matches!(
            decode(&blob),
            Err(TransferError::MissingField("actions"))
        ));
    }

    #[test]
    fn test_limits() {
        let mut m = sample();
        m.set_action_delay(0, MAX_DELAY_MS + 1);
        assert!(matches!(
            check_limits(&m),
            Err(TransferError::DelayTooLong { index: 0, .. })
        ));

        let mut m = sample();
        m.actions = vec![m.actions[0].clone(); MAX_ACTIONS + 1];
        assert!(matches!(
            check_limits(&m),
            Err(TransferError::TooManyActions(1001))
        ));
    }
}
