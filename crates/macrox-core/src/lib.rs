// MacroX Core Library
// Macro definition, capture and binding model

pub mod action;
pub mod backend;
pub mod binder;
pub mod button;
pub mod debounce;
pub mod editor;
pub mod error;
pub mod key;
pub mod layout;
pub mod mode;
pub mod model;
pub mod modifier;
pub mod record;
pub mod settings;
pub mod transfer;
pub mod trigger;
pub mod validate;

pub use action::Action;
pub use backend::{ChangeNotice, CursorProvider, MacroStore, MemoryStore, StoreError};
pub use binder::{bind, occupant, BindResult, BindingError};
pub use button::MouseButton;
pub use debounce::{SettingsDebouncer, SettingsPatch};
pub use editor::{ConflictPolicy, Dispatch, MacroEditor, DEFAULT_GLOBAL_DELAY_MS};
pub use error::{EditorError, ErrorKind, PersistenceError};
pub use key::{
    canonicalize, display_to_physical, label, live_label, to_physical, CanonicalKeyId, UNASSIGNED,
};
pub use layout::Layout;
pub use mode::{
    Activation, ActivationTracker, ContractError, ExecutionMode, PlaybackPlan, TriggerResponse,
};
pub use model::{MacroConfig, MacroId};
pub use modifier::Modifier;
pub use record::{
    CapturePhase, Captured, Cleanup, EventClass, InputEvent, InputHub, InputKind, LocalInputHub,
    PositionCapture, PositionOutcome, RecordingError, RecordingSession, SessionState, Subscription,
    Transition, Trimmed,
};
pub use settings::{Settings, SettingsError, TimeUnit};
pub use transfer::TransferError;
pub use trigger::{Device, Trigger};
pub use validate::{validate, validate_and_assign, ValidationError};
