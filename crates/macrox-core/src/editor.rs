// MacroX Editor
// Application context owning the macro snapshot, the draft and the capture state

use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Instant;

use crate::action::Action;
use crate::backend::{ChangeNotice, CursorProvider, MacroStore};
use crate::binder::{bind, occupant, BindResult, BindingError};
use crate::debounce::{SettingsDebouncer, SettingsPatch};
use crate::error::{EditorError, PersistenceError};
use crate::key::live_label;
use crate::model::{MacroConfig, MacroId};
use crate::record::{
    Captured, Cleanup, InputEvent, InputHub, InputKind, PositionCapture, PositionOutcome,
    RecordingError, RecordingSession, Trimmed,
};
use crate::settings::{Settings, TimeUnit};
use crate::trigger::Trigger;
use crate::validate::validate_and_assign;

/// Delay given to actions added outside a recording
pub const DEFAULT_GLOBAL_DELAY_MS: u32 = 50;

/// What to do when saving onto a trigger another macro holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    #[default]
    Reject,
    /// Delete the other macro, then save
    Overwrite,
}

/// How the editor used an input event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Recorded(Action),
    /// Seen by the recording session but not recorded
    Dropped,
    Position(PositionOutcome),
    /// Nothing is capturing
    Passed,
}

/// The editing context.
///
/// Holds the last loaded macro list, the selected trigger and its draft, the
/// recording session and position capture, and the display settings. Every
/// mutation goes through a method here. Dropping the editor stops an active
/// recording.
pub struct MacroEditor<S: MacroStore> {
    store: S,
    hub: Arc<dyn InputHub>,
    cursor: Arc<dyn CursorProvider>,
    macros: Vec<MacroConfig>,
    selected: Option<Trigger>,
    draft: Option<MacroConfig>,
    session: RecordingSession,
    position: PositionCapture,
    settings: Settings,
    debouncer: SettingsDebouncer,
    changes: Option<Receiver<ChangeNotice>>,
    global_delay_ms: u32,
    last_input: Option<String>,
}

impl<S: MacroStore> MacroEditor<S> {
    /// Create the context and load the macro list
    pub fn new(
        store: S,
        hub: Arc<dyn InputHub>,
        cursor: Arc<dyn CursorProvider>,
        settings: Settings,
    ) -> Result<Self, EditorError> {
        let changes = store.subscribe();
        let mut editor = Self {
            store,
            hub,
            cursor,
            macros: Vec::new(),
            selected: None,
            draft: None,
            session: RecordingSession::new(),
            position: PositionCapture::new(),
            settings,
            debouncer: SettingsDebouncer::default(),
            changes,
            global_delay_ms: DEFAULT_GLOBAL_DELAY_MS,
            last_input: None,
        };
        editor.refresh()?;
        Ok(editor)
    }

    /// Reload the macro list from the store
    pub fn refresh(&mut self) -> Result<(), PersistenceError> {
        self.macros = self
            .store
            .list_macros()
            .map_err(PersistenceError::LoadFailed)?;
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn macros(&self) -> &[MacroConfig] {
        &self.macros
    }

    /// The macro bound to `trigger`. `UNASSIGNED` never resolves.
    pub fn macro_for(&self, trigger: &Trigger) -> Option<&MacroConfig> {
        occupant(trigger, &self.macros, None)
    }

    fn find(&self, id: MacroId) -> Option<&MacroConfig> {
        self.macros.iter().find(|m| m.id() == Some(id))
    }

    pub fn selected(&self) -> Option<&Trigger> {
        self.selected.as_ref()
    }

    pub fn draft(&self) -> Option<&MacroConfig> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut MacroConfig> {
        self.draft.as_mut()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_recording()
    }

    /// Actions recorded so far in the active session
    pub fn recorded(&self) -> &[Action] {
        self.session.actions()
    }

    /// Label of the last key seen while recording, modifier side included
    pub fn last_input(&self) -> Option<&str> {
        self.last_input.as_deref()
    }

    /// Flag a UI element whose events are never recorded
    pub fn ignore_element(&mut self, id: impl Into<String>) {
        self.session.ignore_element(id);
    }

    pub fn global_delay_ms(&self) -> u32 {
        self.global_delay_ms
    }

    pub fn set_global_delay_ms(&mut self, delay_ms: u32) {
        self.global_delay_ms = delay_ms;
    }

    /// Set every draft action's delay to the global delay
    pub fn apply_global_delay(&mut self) -> Result<(), EditorError> {
        let delay = self.global_delay_ms;
        self.draft
            .as_mut()
            .ok_or(EditorError::NothingSelected)?
            .apply_global_delay(delay);
        Ok(())
    }

    /// One pass of the draft in the display unit
    pub fn draft_duration(&self) -> Option<(f64, TimeUnit)> {
        let draft = self.draft.as_ref()?;
        let unit = self.settings.time_unit();
        let ms = u32::try_from(draft.total_duration_ms()).unwrap_or(u32::MAX);
        Some((unit.to_display(ms), unit))
    }

    /// Select a trigger and load its macro, or a fresh draft if it has none.
    ///
    /// An active recording is stopped first. Its actions belonged to the draft
    /// being replaced and are returned rather than carried over.
    pub fn select_trigger(&mut self, trigger: Trigger) -> Vec<Action> {
        let discarded = self.abandon_recording();
        self.position.disarm();
        let draft = match self.macro_for(&trigger) {
            Some(existing) => existing.clone(),
            None => MacroConfig::new_for_trigger(trigger.clone()),
        };
        log::debug!("editor: selected {} ({})", trigger, draft.name);
        self.selected = Some(trigger);
        self.draft = Some(draft);
        discarded
    }

    /// Open a stored macro by id, bound or not.
    ///
    /// Like [`select_trigger`](Self::select_trigger), returns the actions of
    /// an interrupted recording.
    pub fn open_macro(&mut self, id: MacroId) -> Result<Vec<Action>, EditorError> {
        let found = self
            .find(id)
            .cloned()
            .ok_or(BindingError::MacroNotFound(id))?;
        let discarded = self.abandon_recording();
        self.position.disarm();
        self.selected = Some(found.trigger.clone());
        self.draft = Some(found);
        Ok(discarded)
    }

    /// Stop a running recording without touching the draft
    fn abandon_recording(&mut self) -> Vec<Action> {
        if !self.session.is_recording() {
            return Vec::new();
        }
        if let Err(e) = self.session.stop_with(Cleanup::Keep) {
            log::warn!("editor: could not stop recording: {}", e);
        }
        let discarded = self.session.take_actions();
        if !discarded.is_empty() {
            log::warn!("editor: discarded {} recorded actions", discarded.len());
        }
        discarded
    }

    /// Start recording into the current draft.
    ///
    /// Returns `Ok(false)` when a recording is already running; the running
    /// session is left alone.
    pub fn start_recording(&mut self, now_ms: u64) -> Result<bool, EditorError> {
        if self.draft.is_none() {
            return Err(EditorError::NothingSelected);
        }
        if self.session.is_recording() {
            log::debug!("editor: recording already active");
            return Ok(false);
        }
        self.position.disarm();
        self.last_input = None;
        self.session.start(self.hub.clone(), now_ms)?;
        Ok(true)
    }

    /// Stop recording, drop the stopping click and append the rest to the draft
    pub fn stop_recording(&mut self) -> Result<Trimmed, EditorError> {
        self.stop_recording_with(Cleanup::TrailingClick)
    }

    pub fn stop_recording_with(&mut self, cleanup: Cleanup) -> Result<Trimmed, EditorError> {
        let trimmed = self.session.stop_with(cleanup)?;
        let recorded = self.session.take_actions();
        if let Some(draft) = self.draft.as_mut() {
            draft.actions.extend(recorded);
        }
        Ok(trimmed)
    }

    fn finish_recording(&mut self, cleanup: Cleanup) -> Option<Trimmed> {
        if !self.session.is_recording() {
            return None;
        }
        self.stop_recording_with(cleanup).ok()
    }

    /// Arm position capture; not available while recording
    pub fn arm_position_capture(&mut self) -> Result<(), EditorError> {
        if self.draft.is_none() {
            return Err(EditorError::NothingSelected);
        }
        if self.session.is_recording() {
            return Err(RecordingError::AlreadyRecording.into());
        }
        self.position.arm();
        Ok(())
    }

    pub fn cancel_position_capture(&mut self) {
        self.position.disarm();
    }

    pub fn is_capturing_position(&self) -> bool {
        self.position.is_armed()
    }

    /// Capture the pointer now, as when the capture control itself is clicked
    pub fn capture_position_now(&mut self) -> PositionOutcome {
        if self.draft.is_none() {
            return PositionOutcome::NotArmed;
        }
        let outcome = self
            .position
            .capture_now(self.cursor.as_ref(), self.global_delay_ms);
        self.append_captured(&outcome);
        outcome
    }

    fn append_captured(&mut self, outcome: &PositionOutcome) {
        if let (PositionOutcome::Captured(actions), Some(draft)) = (outcome, self.draft.as_mut()) {
            draft.actions.extend(actions.iter().cloned());
        }
    }

    /// Route one input event to position capture or the recording session
    pub fn dispatch(&mut self, event: &InputEvent) -> Dispatch {
        if self.position.is_armed() {
            let outcome = self
                .position
                .handle(event, self.cursor.as_ref(), self.global_delay_ms);
            self.append_captured(&outcome);
            return Dispatch::Position(outcome);
        }
        if !self.session.is_recording() {
            return Dispatch::Passed;
        }
        match self.session.handle(event) {
            Captured::Appended(action) => {
                if let InputKind::Key { physical } = &event.kind {
                    self.last_input = Some(live_label(physical, self.settings.layout()));
                }
                Dispatch::Recorded(action)
            }
            Captured::IgnoredTarget | Captured::Repeat => Dispatch::Dropped,
            Captured::Idle => Dispatch::Passed,
        }
    }

    /// Validate and persist the draft, rejecting trigger conflicts
    pub fn save(&mut self) -> Result<MacroId, EditorError> {
        self.save_with(ConflictPolicy::Reject)
    }

    /// Validate and persist the draft.
    ///
    /// On any failure the draft, the snapshot and every binding stay as they
    /// were. With [`ConflictPolicy::Overwrite`] the macro holding the trigger
    /// is deleted first and restored if the save then fails.
    pub fn save_with(&mut self, policy: ConflictPolicy) -> Result<MacroId, EditorError> {
        let draft = self.draft.as_ref().ok_or(EditorError::NothingSelected)?;
        let mut candidate = draft.clone();
        candidate.normalize_parameters();

        let displaced = occupant(&candidate.trigger, &self.macros, candidate.id()).cloned();
        let displaced = match (displaced, policy) {
            (Some(holder), ConflictPolicy::Reject) => {
                return Err(BindingError::TriggerOccupied {
                    trigger: candidate.trigger.clone(),
                    occupant: holder.id().unwrap_or_default(),
                }
                .into());
            }
            (holder, _) => holder,
        };

        let others: Vec<MacroConfig> = match &displaced {
            Some(holder) => self
                .macros
                .iter()
                .filter(|m| m.id() != holder.id())
                .cloned()
                .collect(),
            None => self.macros.clone(),
        };
        let id = validate_and_assign(&mut candidate, &others)?;

        if let Some(holder_id) = displaced.as_ref().and_then(MacroConfig::id) {
            self.store
                .delete_macro(holder_id)
                .map_err(PersistenceError::SaveFailed)?;
        }
        if let Err(e) = self.store.save_macro(&candidate) {
            if let Some(holder) = &displaced {
                if let Err(restore) = self.store.save_macro(holder) {
                    log::warn!("editor: could not restore {}: {}", holder.name, restore);
                }
            }
            log::warn!("editor: save of {} failed: {}", candidate.name, e);
            return Err(PersistenceError::SaveFailed(e).into());
        }

        log::debug!("editor: saved {} on {}", candidate.name, candidate.trigger);
        if let Some(holder_id) = displaced.as_ref().and_then(MacroConfig::id) {
            self.macros.retain(|m| m.id() != Some(holder_id));
        }
        self.upsert_local(candidate.clone());
        self.draft = Some(candidate);
        self.refresh_after_mutation();
        Ok(id)
    }

    /// Delete the draft's macro and reset the draft for its trigger
    pub fn delete(&mut self) -> Result<(), EditorError> {
        let draft = self.draft.as_ref().ok_or(EditorError::NothingSelected)?;
        if let Some(id) = draft.id() {
            self.delete_macro(id)?;
        }
        let trigger = self.selected.clone().unwrap_or_else(Trigger::unassigned);
        self.draft = Some(MacroConfig::new_for_trigger(trigger));
        Ok(())
    }

    /// Delete any stored macro by id
    pub fn delete_macro(&mut self, id: MacroId) -> Result<(), EditorError> {
        if self.find(id).is_none() {
            log::warn!("editor: delete of unknown macro {}", id);
            return Err(BindingError::MacroNotFound(id).into());
        }
        self.store
            .delete_macro(id)
            .map_err(PersistenceError::DeleteFailed)?;
        self.macros.retain(|m| m.id() != Some(id));
        if self.draft.as_ref().and_then(MacroConfig::id) == Some(id) {
            let trigger = self.selected.clone().unwrap_or_else(Trigger::unassigned);
            self.draft = Some(MacroConfig::new_for_trigger(trigger));
        }
        self.refresh_after_mutation();
        Ok(())
    }

    /// Bind a stored macro to `target` and persist the result (drag onto a key)
    pub fn bind_macro(&mut self, id: MacroId, target: Trigger) -> Result<BindResult, EditorError> {
        let result = bind(id, &target, &self.macros)?;
        if !result.cloned && self.find(id) == Some(&result.updated) {
            return Ok(result);
        }
        self.store
            .save_macro(&result.updated)
            .map_err(PersistenceError::SaveFailed)?;
        self.upsert_local(result.updated.clone());
        if self.draft.as_ref().and_then(MacroConfig::id) == result.updated.id() {
            self.draft = Some(result.updated.clone());
        }
        self.refresh_after_mutation();
        Ok(result)
    }

    pub fn export(&self, id: MacroId) -> Result<String, EditorError> {
        let config = self.find(id).ok_or(BindingError::MacroNotFound(id))?;
        Ok(self
            .store
            .export_macro(config)
            .map_err(PersistenceError::ExportFailed)?)
    }

    pub fn import(&mut self, blob: &str) -> Result<MacroConfig, EditorError> {
        let imported = self
            .store
            .import_macro(blob)
            .map_err(PersistenceError::ImportFailed)?;
        self.upsert_local(imported.clone());
        self.refresh_after_mutation();
        Ok(imported)
    }

    /// Reload if the store announced changes. Returns true if the list was reloaded.
    pub fn poll_changes(&mut self) -> bool {
        let Some(rx) = self.changes.as_ref() else {
            return false;
        };
        let mut changed = false;
        while let Ok(notice) = rx.try_recv() {
            log::trace!("editor: change notice {:?}", notice);
            changed = true;
        }
        if changed {
            if let Err(e) = self.refresh() {
                log::warn!("editor: {}", e);
                return false;
            }
        }
        changed
    }

    /// Apply a settings change now and queue it for persistence
    pub fn update_settings(&mut self, patch: SettingsPatch, now: Instant) {
        self.settings.apply(&patch);
        self.debouncer.push(patch, now);
    }

    /// Settings changes whose quiet period has passed, ready to persist
    pub fn poll_settings(&mut self, now: Instant) -> Option<SettingsPatch> {
        self.debouncer.poll(now)
    }

    /// All pending settings changes, immediately
    pub fn save_settings(&mut self) -> Option<SettingsPatch> {
        self.debouncer.flush()
    }

    /// Tear down: stop an active recording (cleanup included) and hand back
    /// unsaved settings changes.
    pub fn close(&mut self) -> Option<SettingsPatch> {
        if let Some(trimmed) = self.finish_recording(Cleanup::TrailingClick) {
            log::debug!("editor: closed while recording, {} trimmed", trimmed.len());
        }
        self.position.disarm();
        self.debouncer.flush()
    }

    fn upsert_local(&mut self, config: MacroConfig) {
        match self
            .macros
            .iter_mut()
            .find(|m| m.id().is_some() && m.id() == config.id())
        {
            Some(slot) => *slot = config,
            None => self.macros.push(config),
        }
    }

    fn refresh_after_mutation(&mut self) {
        if let Err(e) = self.refresh() {
            log::warn!("editor: keeping local snapshot, {}", e);
        }
    }
}

impl<S: MacroStore> Drop for MacroEditor<S> {
    fn drop(&mut self) {
        self.finish_recording(Cleanup::TrailingClick);
    }
}
