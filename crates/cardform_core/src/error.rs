//! Card form error types

use std::path::PathBuf;

use thiserror::Error;

use crate::field::FieldId;

/// Why a field could not report its position
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeasureError {
    /// The editor has no native view to measure yet
    #[error("field has no layout yet")]
    NotLaidOut,

    /// The editor is not a descendant of the scrolling ancestor
    #[error("field is not inside the scroll surface")]
    Detached,

    /// The editor dropped the request without answering
    #[error("measurement request was dropped")]
    Dropped,

    /// Platform-specific failure
    #[error("platform measurement failed: {0}")]
    Platform(String),
}

/// Card form errors
///
/// None of these stop the form: focus and measurement problems are reported
/// as diagnostics and the form keeps accepting input.
#[derive(Error, Debug)]
pub enum CardFormError {
    /// A field could not be measured; the scroll step was skipped
    #[error("failed to measure field '{field}': {source}")]
    Measurement {
        field: FieldId,
        #[source]
        source: MeasureError,
    },

    /// The focus target is not part of the current form
    #[error("cannot focus hidden field '{field}'")]
    HiddenField { field: FieldId },

    /// The focus target has no editor registered
    #[error("no editor mounted for field '{field}'")]
    NotMounted { field: FieldId },

    /// A string did not name any field
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Configuration file could not be parsed
    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CardFormError {
    /// The field this error concerns, if any
    pub fn field(&self) -> Option<FieldId> {
        match self {
            CardFormError::Measurement { field, .. }
            | CardFormError::HiddenField { field }
            | CardFormError::NotMounted { field } => Some(*field),
            _ => None,
        }
    }
}

/// Result type for card form operations
pub type Result<T> = std::result::Result<T, CardFormError>;
