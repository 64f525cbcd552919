// MacroX Trigger
// The physical input that activates a macro

use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::key::{canonicalize, CanonicalKeyId};

/// Device class a trigger belongs to
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Device {
    #[default]
    Keyboard,
    Mouse,
}

impl Device {
    /// Classify a canonical id
    pub fn of(key: &CanonicalKeyId) -> Device {
        if key.is_mouse() {
            Device::Mouse
        } else {
            Device::Keyboard
        }
    }
}

/// A `(device, key)` pair.
///
/// The device always follows the key: it is inferred on construction and
/// re-derived on deserialize, so the key alone names the binding slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "TriggerRecord")]
pub struct Trigger {
    pub device: Device,
    pub key: CanonicalKeyId,
}

/// Stored shape of a trigger; the device field is advisory
#[derive(Deserialize)]
struct TriggerRecord {
    #[serde(default)]
    device: Device,
    key: CanonicalKeyId,
}

impl From<TriggerRecord> for Trigger {
    fn from(record: TriggerRecord) -> Self {
        let trigger = Trigger::new(record.key);
        if trigger.device != record.device {
            log::debug!("trigger {}: stored device {} corrected", trigger, record.device);
        }
        trigger
    }
}

impl Trigger {
    /// Trigger for a canonical id, inferring the device
    pub fn new(key: CanonicalKeyId) -> Self {
        Self {
            device: Device::of(&key),
            key,
        }
    }

    /// Build a trigger from any physical id, inferring the device
    pub fn from_physical(physical: &str) -> Self {
        Self::new(canonicalize(physical))
    }

    pub fn unassigned() -> Self {
        Self {
            device: Device::Keyboard,
            key: CanonicalKeyId::unassigned(),
        }
    }

    pub fn is_unassigned(&self) -> bool {
        self.key.is_unassigned()
    }
}

impl Default for Trigger {
    fn default() -> Self {
        Self::unassigned()
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.device, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_physical_infers_device() {
        let key = Trigger::from_physical("KeyQ");
        assert_eq!(key.device, Device::Keyboard);
        assert_eq!(key.key, "Q");

        let mouse = Trigger::from_physical("MouseX2");
        assert_eq!(mouse.device, Device::Mouse);
        assert_eq!(mouse.key, "MOUSE_FORWARD");
    }

    #[test]
    fn test_unassigned() {
        assert!(Trigger::unassigned().is_unassigned());
        assert!(Trigger::default().is_unassigned());
        assert!(!Trigger::from_physical("F5").is_unassigned());
    }

    #[test]
    fn test_display() {
        assert_eq!(Trigger::from_physical("KeyQ").to_string(), "keyboard:Q");
        assert_eq!(Trigger::from_physical("MouseLeft").to_string(), "mouse:MOUSE_LEFT");
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_string(&Trigger::from_physical("Digit3")).unwrap();
        assert_eq!(json, r#"{"device":"keyboard","key":"3"}"#);
        let parsed: Trigger = serde_json::from_str(r#"{"device":"keyboard","key":"KeyW"}"#).unwrap();
        assert_eq!(parsed.key, "W");
    }

    #[test]
    fn test_device_follows_key_on_load() {
        let parsed: Trigger =
            serde_json::from_str(r#"{"device":"keyboard","key":"MOUSE_LEFT"}"#).unwrap();
        assert_eq!(parsed.device, Device::Mouse);
        assert_eq!(parsed, Trigger::from_physical("MouseLeft"));

        let parsed: Trigger = serde_json::from_str(r#"{"device":"mouse","key":"KeyQ"}"#).unwrap();
        assert_eq!(parsed.device, Device::Keyboard);

        let parsed: Trigger = serde_json::from_str(r#"{"key":"MouseX1"}"#).unwrap();
        assert_eq!(parsed, Trigger::from_physical("MOUSE_BACK"));
    }
}
