// MacroX Settings Debounce
// Merges rapid settings changes and releases them after a quiet period

use std::time::{Duration, Instant};

use crate::layout::Layout;
use crate::settings::TimeUnit;

/// Quiet period before a pending patch is released
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(1000);

/// A partial settings change. Unset fields leave the current value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    pub layout: Option<Layout>,
    pub time_unit: Option<TimeUnit>,
    pub active_profile: Option<String>,
    pub extra: toml::Table,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.layout.is_none()
            && self.time_unit.is_none()
            && self.active_profile.is_none()
            && self.extra.is_empty()
    }

    /// Fold a later patch into this one; fields set in `later` win
    pub fn merge(&mut self, later: SettingsPatch) {
        if later.layout.is_some() {
            self.layout = later.layout;
        }
        if later.time_unit.is_some() {
            self.time_unit = later.time_unit;
        }
        if later.active_profile.is_some() {
            self.active_profile = later.active_profile;
        }
        self.extra.extend(later.extra);
    }
}

/// Trailing debounce over settings patches.
///
/// Time is passed in, so the debouncer holds no clock of its own.
#[derive(Debug, Clone)]
pub struct SettingsDebouncer {
    quiet: Duration,
    pending: Option<SettingsPatch>,
    last_change: Option<Instant>,
}

impl Default for SettingsDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

impl SettingsDebouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
            last_change: None,
        }
    }

    /// Queue a change at `now`, restarting the quiet period
    pub fn push(&mut self, patch: SettingsPatch, now: Instant) {
        match self.pending.as_mut() {
            Some(pending) => pending.merge(patch),
            None => self.pending = Some(patch),
        }
        self.last_change = Some(now);
    }

    /// Release the merged patch once the quiet period has passed
    pub fn poll(&mut self, now: Instant) -> Option<SettingsPatch> {
        match self.deadline() {
            Some(deadline) if now >= deadline => self.flush(),
            _ => None,
        }
    }

    /// Release the merged patch immediately, as on an explicit save
    pub fn flush(&mut self) -> Option<SettingsPatch> {
        self.last_change = None;
        self.pending.take().filter(|p| !p.is_empty())
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending patch will be released
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref()?;
        self.last_change.map(|t| t + self.quiet)
    }
}
