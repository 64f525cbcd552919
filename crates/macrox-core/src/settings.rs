// MacroX Settings Module
// Display preferences passed through to the editor: layout, time unit, active profile

use std::path::{Path, PathBuf};

use strum_macros::{Display, EnumString, IntoStaticStr};

use crate::debounce::SettingsPatch;
use crate::layout::Layout;

/// Unit delays are shown in. Stored delays are always milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum TimeUnit {
    #[default]
    #[strum(serialize = "ms")]
    Milliseconds,
    #[strum(serialize = "s")]
    Seconds,
    #[strum(serialize = "m")]
    Minutes,
}

impl TimeUnit {
    fn factor(self) -> f64 {
        match self {
            TimeUnit::Milliseconds => 1.0,
            TimeUnit::Seconds => 1_000.0,
            TimeUnit::Minutes => 60_000.0,
        }
    }

    pub fn suffix(self) -> &'static str {
        self.into()
    }

    /// Milliseconds as shown in this unit, rounded to three decimals
    pub fn to_display(self, ms: u32) -> f64 {
        let value = f64::from(ms) / self.factor();
        (value * 1_000.0).round() / 1_000.0
    }

    /// Displayed value back to whole milliseconds; negatives clamp to 0
    pub fn from_display(self, value: f64) -> u32 {
        let ms = (value * self.factor()).round();
        if ms.is_nan() || ms <= 0.0 {
            0
        } else if ms >= f64::from(u32::MAX) {
            u32::MAX
        } else {
            ms as u32
        }
    }
}

/// Editor preferences.
///
/// Loaded from a TOML file (default: ~/.config/macrox/settings.toml). None
/// of these change how macros are stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    layout: Layout,
    time_unit: TimeUnit,
    active_profile: String,
    /// Keys this crate does not interpret (theme, language, scale, ...)
    extra: toml::Table,
    source_path: Option<PathBuf>,
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid setting value: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
struct SettingsToml {
    #[serde(default)]
    keyboard: Option<KeyboardSettings>,

    #[serde(default)]
    display: Option<DisplaySettings>,

    #[serde(default)]
    profile: Option<ProfileSettings>,

    #[serde(default)]
    extra: Option<toml::Table>,
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
struct KeyboardSettings {
    #[serde(default)]
    layout: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
struct DisplaySettings {
    #[serde(default)]
    time_unit: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
struct ProfileSettings {
    #[serde(default)]
    active: Option<String>,
}

pub const DEFAULT_PROFILE: &str = "Default";

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

impl Settings {
    pub fn new() -> Self {
        Self {
            layout: Layout::Qwerty,
            time_unit: TimeUnit::Milliseconds,
            active_profile: DEFAULT_PROFILE.to_string(),
            extra: toml::Table::new(),
            source_path: None,
        }
    }

    /// Load settings from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(&path)?;
        let mut settings = Self::from_toml(&content)?;
        settings.source_path = Some(path.as_ref().to_path_buf());
        Ok(settings)
    }

    /// Load settings from TOML string
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let parsed: SettingsToml =
            toml::from_str(content).map_err(|e| SettingsError::TomlParse(e.to_string()))?;

        let mut settings = Self::new();

        if let Some(layout) = parsed.keyboard.and_then(|k| k.layout) {
            settings.layout = layout.parse().map_err(|_| {
                SettingsError::InvalidValue(format!(
                    "unknown layout '{}', expected qwerty, azerty or qwertz",
                    layout
                ))
            })?;
        }

        if let Some(unit) = parsed.display.and_then(|d| d.time_unit) {
            settings.time_unit = unit.trim().parse().map_err(|_| {
                SettingsError::InvalidValue(format!(
                    "unknown time unit '{}', expected ms, s or m",
                    unit
                ))
            })?;
        }

        if let Some(active) = parsed.profile.and_then(|p| p.active) {
            let active = active.trim();
            if active.is_empty() {
                return Err(SettingsError::InvalidValue(
                    "profile.active must not be empty".to_string(),
                ));
            }
            settings.active_profile = active.to_string();
        }

        if let Some(extra) = parsed.extra {
            settings.extra = extra;
        }

        Ok(settings)
    }

    /// Get the default settings path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("macrox").join("settings.toml"))
    }

    /// Load from default location (~/.config/macrox/settings.toml)
    pub fn load_default() -> Result<Self, SettingsError> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::from_file(path);
            }
        }
        Ok(Self::new())
    }

    /// Reload settings from the original file
    pub fn reload(&mut self) -> Result<(), SettingsError> {
        if let Some(ref path) = self.source_path {
            let new_settings = Self::from_file(path)?;
            *self = new_settings;
            Ok(())
        } else {
            Err(SettingsError::InvalidValue("No source path set".to_string()))
        }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn time_unit(&self) -> TimeUnit {
        self.time_unit
    }

    pub fn active_profile(&self) -> &str {
        &self.active_profile
    }

    /// Uninterpreted `[extra]` value
    pub fn extra(&self, key: &str) -> Option<&toml::Value> {
        self.extra.get(key)
    }

    /// Apply a patch in place
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(layout) = patch.layout {
            self.layout = layout;
        }
        if let Some(unit) = patch.time_unit {
            self.time_unit = unit;
        }
        if let Some(ref profile) = patch.active_profile {
            self.active_profile = profile.clone();
        }
        for (key, value) in &patch.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }

    /// Serialize back to the file format
    pub fn to_toml(&self) -> String {
        let mut keyboard = toml::Table::new();
        keyboard.insert("layout".into(), self.layout.to_string().into());
        let mut display = toml::Table::new();
        display.insert("time_unit".into(), self.time_unit.suffix().into());
        let mut profile = toml::Table::new();
        profile.insert("active".into(), self.active_profile.clone().into());

        let mut root = toml::Table::new();
        root.insert("keyboard".into(), keyboard.into());
        root.insert("display".into(), display.into());
        root.insert("profile".into(), profile.into());
        if !self.extra.is_empty() {
            root.insert("extra".into(), self.extra.clone().into());
        }
        root.to_string()
    }
}

/// Create default settings content for a new installation
pub fn default_settings_content() -> &'static str {
    r#"# MacroX Settings
# Place this file at: ~/.config/macrox/settings.toml

[keyboard]
# Printed layout used for key labels: "qwerty", "azerty" or "qwertz"
layout = "qwerty"

[display]
# Unit delays are shown in: "ms", "s" or "m"
time_unit = "ms"

[profile]
active = "Default"

[extra]
# Passed through untouched
# theme = "dark"
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = Settings::new();
        assert_eq!(settings.layout(), Layout::Qwerty);
        assert_eq!(settings.time_unit(), TimeUnit::Milliseconds);
        assert_eq!(settings.active_profile(), "Default");
    }

    #[test]
    fn test_settings_from_toml() {
        let toml = r#"
[keyboard]
layout = "AZERTY"

[display]
time_unit = "s"

[profile]
active = "Gaming"

[extra]
theme = "dark"
"#;

        let settings = Settings::from_toml(toml).unwrap();
        assert_eq!(settings.layout(), Layout::Azerty);
        assert_eq!(settings.time_unit(), TimeUnit::Seconds);
        assert_eq!(settings.active_profile(), "Gaming");
        assert_eq!(settings.extra("theme").and_then(|v| v.as_str()), Some("dark"));
    }

    #[test]
    fn test_default_content_parses() {
        let settings = Settings::from_toml(default_settings_content()).unwrap();
        assert_eq!(settings, Settings::new());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            Settings::from_toml("[keyboard]\nlayout = \"dvorak\""),
            Err(SettingsError::InvalidValue(_))
        ));
        assert!(matches!(
            Settings::from_toml("[display]\ntime_unit = \"h\""),
            Err(SettingsError::InvalidValue(_))
        ));
        assert!(matches!(
            Settings::from_toml("not = [toml"),
            Err(SettingsError::TomlParse(_))
        ));
    }

    #[test]
    fn test_to_toml_round_trip() {
        let mut settings = Settings::from_toml("[extra]\nscale = 1.2").unwrap();
        settings.apply(&SettingsPatch {
            layout: Some(Layout::Qwertz),
            time_unit: Some(TimeUnit::Minutes),
            ..SettingsPatch::default()
        });
        let reparsed = Settings::from_toml(&settings.to_toml()).unwrap();
        assert_eq!(reparsed, settings);
    }

    #[test]
    fn test_reload_without_path() {
        let mut settings = Settings::new();
        assert!(settings.reload().is_err());
    }

    #[test]
    fn test_time_unit_conversion() {
        assert_eq!(TimeUnit::Milliseconds.to_display(1500), 1500.0);
        assert_eq!(TimeUnit::Seconds.to_display(1500), 1.5);
        assert_eq!(TimeUnit::Minutes.to_display(90_000), 1.5);
        assert_eq!(TimeUnit::Minutes.to_display(1), 0.0);
        assert_eq!(TimeUnit::Seconds.from_display(0.25), 250);
        assert_eq!(TimeUnit::Seconds.from_display(-3.0), 0);
        assert_eq!("S".parse::<TimeUnit>().unwrap(), TimeUnit::Seconds);
    }

    #[test]
    fn test_time_unit_names() {
        assert_eq!(TimeUnit::Milliseconds.to_string(), "ms");
        assert_eq!(TimeUnit::Minutes.suffix(), "m");
        assert_eq!("MS".parse::<TimeUnit>(), Ok(TimeUnit::Milliseconds));
        assert!("h".parse::<TimeUnit>().is_err());
        assert!("seconds".parse::<TimeUnit>().is_err());

        let settings = Settings::from_toml("[display]\ntime_unit = \" s \"").unwrap();
        assert_eq!(settings.time_unit(), TimeUnit::Seconds);
    }
}
