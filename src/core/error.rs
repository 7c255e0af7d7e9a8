//! Error taxonomy for lab operations

use miette::Diagnostic;
use thiserror::Error;

use crate::core::identity::EntityId;
use crate::core::storage::{CollectionKey, StorageError};
use crate::json::ImportParseError;

/// Errors returned by [`crate::core::Lab`] operations
///
/// Every error is also reported once to the notification sink by the
/// operation that produced it.
#[derive(Debug, Error, Diagnostic)]
pub enum LabError {
    #[error("{0}")]
    #[diagnostic(code(labdesk::validation))]
    Validation(String),

    #[error("no {kind} found with ID {id}")]
    #[diagnostic(
        code(labdesk::not_found),
        help("list the collection to see valid IDs and short IDs")
    )]
    NotFound { kind: &'static str, id: EntityId },

    #[error("cannot delete {kind} {id}: still referenced by {count} order(s)")]
    #[diagnostic(
        code(labdesk::reference_in_use),
        help("delete the referencing orders or point them elsewhere first")
    )]
    ReferenceInUse {
        kind: &'static str,
        id: EntityId,
        count: usize,
    },

    #[error("order {order_id} already has {kind} {number}")]
    #[diagnostic(code(labdesk::duplicate_document))]
    DuplicateDocument {
        kind: &'static str,
        order_id: EntityId,
        number: String,
    },

    #[error("storage failure on '{key}': {source}")]
    #[diagnostic(code(labdesk::persistence))]
    Persistence {
        key: CollectionKey,
        #[source]
        source: StorageError,
    },

    #[error("could not encode export: {0}")]
    #[diagnostic(code(labdesk::export))]
    Export(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    ImportParse(#[from] ImportParseError),
}

impl LabError {
    pub fn validation(message: impl Into<String>) -> Self {
        LabError::Validation(message.into())
    }

    pub fn not_found(id: &EntityId) -> Self {
        LabError::NotFound {
            kind: id.prefix().kind(),
            id: id.clone(),
        }
    }
}
