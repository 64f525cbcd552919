// MacroX Trigger Binder
// Keeps at most one macro per trigger and clones macros dragged onto a new trigger

use crate::model::{MacroConfig, MacroId};
use crate::trigger::Trigger;
use crate::validate::{names_collide, sanitize_name};

/// Binding failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    #[error("macro {0} not found")]
    MacroNotFound(MacroId),

    #[error("trigger {trigger} is already bound to macro {occupant}")]
    TriggerOccupied { trigger: Trigger, occupant: MacroId },
}

/// Outcome of [`bind`]. `updated` is the record to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindResult {
    pub updated: MacroConfig,
    /// True when `updated` is a new macro and the source was left untouched
    pub cloned: bool,
}

/// The macro other than `except` holding `trigger`, if any.
///
/// `UNASSIGNED` is never occupied: any number of macros may be unbound.
/// Slots compare by key; the device is derived from it.
pub fn occupant<'a>(
    trigger: &Trigger,
    all: &'a [MacroConfig],
    except: Option<MacroId>,
) -> Option<&'a MacroConfig> {
    if trigger.is_unassigned() {
        return None;
    }
    all.iter()
        .find(|m| m.trigger.key == trigger.key && (except.is_none() || m.id() != except))
}

/// Bind the macro `macro_id` to `target`.
///
/// An unbound macro is rebound in place and keeps its id. A macro already bound
/// to a different trigger is copied under a fresh id onto `target`; the
/// original and its binding stay as they are. Binding onto a trigger that hosts
/// a different macro fails with [`BindingError::TriggerOccupied`]. Nothing is
/// persisted here.
pub fn bind(
    macro_id: MacroId,
    target: &Trigger,
    all: &[MacroConfig],
) -> Result<BindResult, BindingError> {
    let Some(source) = all.iter().find(|m| m.id() == Some(macro_id)) else {
        log::warn!("bind: macro {} not found", macro_id);
        return Err(BindingError::MacroNotFound(macro_id));
    };

    if source.trigger.key == target.key {
        return Ok(BindResult {
            updated: source.clone(),
            cloned: false,
        });
    }

    if let Some(holder) = occupant(target, all, Some(macro_id)) {
        // an occupant with no id cannot come out of a store
        let occupant = holder.id().unwrap_or(macro_id);
        return Err(BindingError::TriggerOccupied {
            trigger: target.clone(),
            occupant,
        });
    }

    if source.trigger.is_unassigned() {
        log::debug!("bind: {} moves to {}", source.name, target);
        let mut updated = source.clone();
        updated.trigger = target.clone();
        return Ok(BindResult {
            updated,
            cloned: false,
        });
    }

    let name = clone_name(&source.name, target, all);
    log::debug!(
        "bind: cloning {} from {} onto {} as {:?}",
        source.name,
        source.trigger,
        target,
        name
    );
    Ok(BindResult {
        updated: source.cloned_for(target.clone(), name),
        cloned: true,
    })
}

/// Name for a clone that does not collide with any existing macro.
///
/// Unknown key ids may carry characters a name cannot hold; those become `_`.
fn clone_name(base: &str, target: &Trigger, all: &[MacroConfig]) -> String {
    let base = base.trim();
    let key = sanitize_name(target.key.as_str());
    let taken = |candidate: &str| all.iter().any(|m| names_collide(&m.name, candidate));

    let first = format!("{} ({})", base, key);
    if !taken(&first) {
        return first;
    }
    (2u32..)
        .map(|n| format!("{} ({}) {}", base, key, n))
        .find(|candidate| !taken(candidate))
        .unwrap_or(first)
}
