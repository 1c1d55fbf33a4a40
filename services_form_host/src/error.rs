//! Structural errors of the form host
//!
//! Failures of host collaborators never appear here; they are reported as
//! notifications and a [`crate::CommandOutcome`].

use crate::command::CommandId;
use form_types::{IdentityKey, ViewKind};
use services_form_binder::BindError;
use thiserror::Error;

/// Form host error types
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormError {
    #[error("Missing metadata for {type_name}: {reason}")]
    MissingMetadata { type_name: String, reason: String },

    #[error("View not found: {0}")]
    ViewNotFound(IdentityKey),

    #[error("View {key} is not a {expected} view")]
    WrongViewKind { key: IdentityKey, expected: ViewKind },

    #[error("View {key} has no command {command}")]
    UnknownCommand { key: IdentityKey, command: CommandId },

    #[error("View {key} has no row {index}")]
    RowOutOfRange { key: IdentityKey, index: usize },

    #[error("Failed to load rows: {0}")]
    Query(#[from] form_types::PersistenceError),

    #[error(transparent)]
    Bind(#[from] BindError),
}

impl FormError {
    pub(crate) fn missing_metadata(type_name: &str, reason: impl Into<String>) -> Self {
        FormError::MissingMetadata {
            type_name: type_name.to_string(),
            reason: reason.into(),
        }
    }
}
