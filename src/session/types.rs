use serde::{Deserialize, Serialize};

use crate::database::DbError;
use crate::docs::Document;

/// Whether the open document has edits not reflected in its stored copy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SaveState {
    Clean,
    Dirty,
}

impl SaveState {
    pub fn is_dirty(&self) -> bool {
        matches!(self, SaveState::Dirty)
    }
}

/// Result of a "Save As" attempt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SaveAsOutcome {
    Saved { document: Document },
    /// Another stored document already has this name; nothing was written.
    /// Retry with `overwrite` set once the user confirms.
    NameCollision { existing: Document },
}

/// Failure reported by a persistence collaborator
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] DbError),
    #[error("Document storage is unavailable: {0}")]
    Unavailable(String),
    #[error("Storage task join error: {0}")]
    Join(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Document has no name; use Save As")]
    Unnamed,
    #[error("Document name cannot be empty")]
    EmptyName,
    #[error("Document has unsaved changes")]
    UnsavedChanges,
}

