//! Validation errors for incoming movie and actor payloads.

use thiserror::Error;

/// A payload failed domain validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was absent or null.
    #[error("field '{field}' is required")]
    MissingField { field: &'static str },

    /// A required text field was present but blank.
    #[error("field '{field}' must not be empty")]
    EmptyField { field: &'static str },

    /// A field had a value outside its accepted range or format.
    #[error("field '{field}' is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl ValidationError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField { field }
            | Self::EmptyField { field }
            | Self::InvalidField { field, .. } => *field,
        }
    }
}
