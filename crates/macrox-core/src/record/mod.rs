// MacroX Recording
// Live capture of key and button events into macro actions

pub mod event;
pub mod hub;
pub mod position;
pub mod session;

pub use event::{EventClass, InputEvent, InputKind, Transition};
pub use hub::{CapturePhase, InputHub, ListenerId, LocalInputHub, Subscription};
pub use position::{PositionCapture, PositionOutcome};
pub use session::{Captured, Cleanup, RecordingError, RecordingSession, SessionState, Trimmed};
