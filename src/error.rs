use std::path::PathBuf;
use thiserror::Error;

use crate::data::SequenceId;
use crate::geometry::GeometryError;

/// Result type for soundevent operations.
pub type Result<T> = std::result::Result<T, SoundEventError>;

/// Coarse classification of a [`SoundEventError`].
///
/// Lets callers branch on the failure category without matching payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or out-of-invariant construction input.
    Validation,
    /// Degenerate input to a geometry operation.
    Geometry,
    /// Cross-entity reference that could not be resolved.
    Reference,
    /// Sequence parent chain that loops back on itself.
    Cycle,
    /// Filesystem or document text failure.
    Io,
}

/// The main error type for soundevent operations.
#[derive(Debug, Error)]
pub enum SoundEventError {
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("Unresolved {kind} reference {id}")]
    Reference { kind: &'static str, id: String },

    #[error("Sequence {sequence} would become its own ancestor")]
    Cycle { sequence: SequenceId },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse document from {path}: {source}")]
    DocumentParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write document to {path}: {source}")]
    DocumentWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported entity kind: {0}")]
    UnsupportedKind(String),
}

impl SoundEventError {
    /// Creates a validation error for the named field.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a reference error for an identifier of the given entity kind.
    #[must_use]
    pub fn reference(kind: &'static str, id: impl ToString) -> Self {
        Self::Reference {
            kind,
            id: id.to_string(),
        }
    }

    /// Returns the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } | Self::UnsupportedKind(_) => ErrorKind::Validation,
            Self::Geometry(_) => ErrorKind::Geometry,
            Self::Reference { .. } => ErrorKind::Reference,
            Self::Cycle { .. } => ErrorKind::Cycle,
            Self::Io(_) | Self::DocumentParse { .. } | Self::DocumentWrite { .. } => ErrorKind::Io,
        }
    }

    /// Prefixes the field path of a validation error.
    ///
    /// Other error kinds pass through untouched.
    pub(crate) fn within(self, parent: &str) -> Self {
        match self {
            Self::Validation { field, message } => Self::Validation {
                field: format!("{parent}.{field}"),
                message,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            SoundEventError::validation("duration", "must be positive").kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            SoundEventError::from(GeometryError::EmptyDiscretization { axis: "time" }).kind(),
            ErrorKind::Geometry
        );
        assert_eq!(
            SoundEventError::reference("SoundEvent", "abc").kind(),
            ErrorKind::Reference
        );
    }

    #[test]
    fn test_within_prefixes_field_path() {
        let err = SoundEventError::validation("coordinates[1]", "negative time").within("geometry");
        match err {
            SoundEventError::Validation { field, .. } => assert_eq!(field, "geometry.coordinates[1]"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
