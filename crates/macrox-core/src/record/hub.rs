// MacroX Input Hub
// Global input subscriptions with guaranteed release

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;

use super::event::EventClass;

/// Where a listener sits in event delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePhase {
    /// Before any other handler sees the event
    Capture,
    /// After the UI has handled it
    Bubble,
}

/// Handle identifying one attached listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// The shared global input channel.
///
/// Implementations route events for the attached classes to the session that
/// holds the listener.
pub trait InputHub: Send + Sync {
    fn attach(&self, classes: &[EventClass], phase: CapturePhase) -> ListenerId;
    fn detach(&self, id: ListenerId);
}

/// An attached listener. Dropping it detaches.
pub struct Subscription {
    hub: Arc<dyn InputHub>,
    id: ListenerId,
}

impl Subscription {
    pub fn new(hub: Arc<dyn InputHub>, classes: &[EventClass], phase: CapturePhase) -> Self {
        let id = hub.attach(classes, phase);
        Self { hub, id }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.detach(self.id);
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[derive(Debug, Clone)]
struct Listener {
    classes: Vec<EventClass>,
    phase: CapturePhase,
}

/// In-process hub that only tracks listeners.
///
/// Keyboard classes attached in capture phase are suppressed for the rest of
/// the UI; mouse classes are only observed, so clicks still reach buttons.
#[derive(Debug, Default)]
pub struct LocalInputHub {
    next_id: AtomicU64,
    listeners: Mutex<IndexMap<ListenerId, Listener>>,
}

impl LocalInputHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Whether events of `class` are currently kept from the rest of the UI
    pub fn suppresses(&self, class: EventClass) -> bool {
        class.is_keyboard()
            && self
                .listeners
                .lock()
                .values()
                .any(|l| l.phase == CapturePhase::Capture && l.classes.contains(&class))
    }

    /// Whether any listener receives `class`
    pub fn observes(&self, class: EventClass) -> bool {
        self.listeners
            .lock()
            .values()
            .any(|l| l.classes.contains(&class))
    }
}

impl InputHub for LocalInputHub {
    fn attach(&self, classes: &[EventClass], phase: CapturePhase) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().insert(
            id,
            Listener {
                classes: classes.to_vec(),
                phase,
            },
        );
        log::trace!("input hub: attached listener {:?} for {:?}", id, classes);
        id
    }

    fn detach(&self, id: ListenerId) {
        if self.listeners.lock().shift_remove(&id).is_some() {
            log::trace!("input hub: detached listener {:?}", id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_detaches_on_drop() {
        let hub = Arc::new(LocalInputHub::new());
        {
            let _sub = Subscription::new(hub.clone(), &EventClass::ALL, CapturePhase::Capture);
            assert_eq!(hub.listener_count(), 1);
        }
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn test_capture_suppresses_keyboard_only() {
        let hub = Arc::new(LocalInputHub::new());
        let _sub = Subscription::new(hub.clone(), &EventClass::ALL, CapturePhase::Capture);
        assert!(hub.suppresses(EventClass::KeyPress));
        assert!(hub.suppresses(EventClass::KeyRelease));
        assert!(!hub.suppresses(EventClass::ButtonPress));
        assert!(hub.observes(EventClass::ButtonPress));
    }

    #[test]
    fn test_bubble_phase_suppresses_nothing() {
        let hub = Arc::new(LocalInputHub::new());
        let _sub = Subscription::new(hub.clone(), &[EventClass::KeyPress], CapturePhase::Bubble);
        assert!(!hub.suppresses(EventClass::KeyPress));
        assert!(!hub.observes(EventClass::ButtonRelease));
    }

    #[test]
    fn test_listener_ids_are_distinct() {
        let hub = Arc::new(LocalInputHub::new());
        let a = Subscription::new(hub.clone(), &[EventClass::KeyPress], CapturePhase::Capture);
        let b = Subscription::new(hub.clone(), &[EventClass::KeyPress], CapturePhase::Capture);
        assert_ne!(a.id(), b.id());
        drop(a);
        assert_eq!(hub.listener_count(), 1);
    }
}
