// MacroX Editor Errors
// Error taxonomy surfaced to the presentation layer

use strum_macros::{Display, IntoStaticStr};

use crate::backend::StoreError;
use crate::binder::BindingError;
use crate::record::RecordingError;
use crate::validate::ValidationError;

/// Backend failures. The in-memory edit state is kept so the user can retry.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("could not load macros: {0}")]
    LoadFailed(#[source] StoreError),

    #[error("could not save macro: {0}")]
    SaveFailed(#[source] StoreError),

    #[error("could not delete macro: {0}")]
    DeleteFailed(#[source] StoreError),

    #[error("could not import macro: {0}")]
    ImportFailed(#[source] StoreError),

    #[error("could not export macro: {0}")]
    ExportFailed(#[source] StoreError),
}

/// Any failure of an editor operation
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    Recording(#[from] RecordingError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("no trigger or macro is selected")]
    NothingSelected,
}

/// Flat error kind for user-facing messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    EmptyFields,
    IllegalCharacters,
    DuplicateName,
    InvalidParameters,
    LoadFailed,
    SaveFailed,
    DeleteFailed,
    ImportFailed,
    ExportFailed,
    MacroNotFound,
    TriggerOccupied,
    AlreadyRecording,
    NotRecording,
}

impl EditorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EditorError::Validation(e) => match e {
                ValidationError::EmptyFields => ErrorKind::EmptyFields,
                ValidationError::IllegalCharacters => ErrorKind::IllegalCharacters,
                ValidationError::DuplicateName(_) => ErrorKind::DuplicateName,
                ValidationError::InvalidParameters(_) => ErrorKind::InvalidParameters,
            },
            EditorError::Binding(e) => match e {
                BindingError::MacroNotFound(_) => ErrorKind::MacroNotFound,
                BindingError::TriggerOccupied { .. } => ErrorKind::TriggerOccupied,
            },
            EditorError::Recording(e) => match e {
                RecordingError::AlreadyRecording => ErrorKind::AlreadyRecording,
                RecordingError::NotRecording => ErrorKind::NotRecording,
            },
            EditorError::Persistence(e) => match e {
                PersistenceError::LoadFailed(_) => ErrorKind::LoadFailed,
                PersistenceError::SaveFailed(_) => ErrorKind::SaveFailed,
                PersistenceError::DeleteFailed(_) => ErrorKind::DeleteFailed,
                PersistenceError::ImportFailed(_) => ErrorKind::ImportFailed,
                PersistenceError::ExportFailed(_) => ErrorKind::ExportFailed,
            },
            // saving with nothing selected reads as a missing field
            EditorError::NothingSelected => ErrorKind::EmptyFields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MacroId;

    #[test]
    fn test_kind_mapping() {
        let e: EditorError = ValidationError::DuplicateName("x".into()).into();
        assert_eq!(e.kind(), ErrorKind::DuplicateName);

        let e: EditorError = BindingError::MacroNotFound(MacroId::new()).into();
        assert_eq!(e.kind(), ErrorKind::MacroNotFound);

        let e: EditorError = PersistenceError::SaveFailed(StoreError::Backend("disk full".into())).into();
        assert_eq!(e.kind(), ErrorKind::SaveFailed);

        assert_eq!(EditorError::NothingSelected.kind(), ErrorKind::EmptyFields);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ErrorKind::TriggerOccupied.to_string(), "trigger_occupied");
        let name: &'static str = ErrorKind::SaveFailed.into();
        assert_eq!(name, "save_failed");
    }
}
