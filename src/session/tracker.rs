//! Save-state tracking for the open document.
//!
//! The session holds the live content reported by the editor and a snapshot of
//! the content as last saved or loaded. It is dirty exactly when the two differ
//! after normalization. Every `&mut self` operation is exclusive, so at most one
//! save can be in flight per session.

use std::sync::Arc;

use super::pointer::LastOpenedPointer;
use super::store::DocumentStore;
use super::types::{SaveAsOutcome, SaveState, SessionError};
use crate::content::{normalize, text_to_paragraphs};
use crate::docs::Document;
use crate::export::{ContentExporter, ExportArtifact, ExportError};
use crate::ocr::TextInserter;

pub struct EditorSession {
    store: Arc<dyn DocumentStore>,
    pointer: Arc<dyn LastOpenedPointer>,
    document: Document,
    last_saved_content: String,
    /// Bumped whenever a different document becomes the open one
    generation: u64,
}

impl EditorSession {
    /// Session on a blank, untitled document
    pub fn new(store: Arc<dyn DocumentStore>, pointer: Arc<dyn LastOpenedPointer>) -> Self {
        Self {
            store,
            pointer,
            document: Document::untitled(),
            last_saved_content: String::new(),
            generation: 0,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn content(&self) -> &str {
        &self.document.content
    }

    pub fn last_saved_content(&self) -> &str {
        &self.last_saved_content
    }

    /// Identifies which document is open. Work started against one generation
    /// must not be applied to another.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_dirty(&self) -> bool {
        self.document.content != self.last_saved_content
            && normalize(&self.document.content) != normalize(&self.last_saved_content)
    }

    pub fn save_state(&self) -> SaveState {
        if self.is_dirty() {
            SaveState::Dirty
        } else {
            SaveState::Clean
        }
    }

    /// Plain save needs a name; unnamed documents go through Save As
    pub fn can_save(&self) -> bool {
        self.document.has_name()
    }

    /// Record new content from the editor. No I/O.
    pub fn edit(&mut self, content: impl Into<String>) {
        self.document.content = content.into();
    }

    /// Drop unsaved edits. Returns the content the editor should now show.
    pub fn discard(&mut self) -> &str {
        if self.document.content != self.last_saved_content {
            self.document.content.clone_from(&self.last_saved_content);
            tracing::debug!(document = self.document.display_name(), "discarded unsaved changes");
        }
        &self.document.content
    }

    /// Persist the open document under its current name.
    ///
    /// On failure nothing changes and the session stays dirty, so retrying is
    /// simply calling `save` again.
    pub async fn save(&mut self) -> Result<&Document, SessionError> {
        if !self.can_save() {
            return Err(SessionError::Unnamed);
        }

        let candidate = Document {
            updated_at: Some(chrono::Utc::now().timestamp_millis()),
            ..self.document.clone()
        };

        self.persist(candidate).await
    }

    /// Persist the live content under `name`.
    ///
    /// When another stored document already has that exact name nothing is
    /// written unless `overwrite` is set; the overwrite keeps that document's id
    /// and creation time. A new name always creates a new document.
    pub async fn save_as(&mut self, name: &str, overwrite: bool) -> Result<SaveAsOutcome, SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyName);
        }

        let existing = self.store.find_by_name(name).await?;
        let (id, created_at) = match existing {
            Some(existing) if existing.id.is_some() && existing.id == self.document.id => {
                (existing.id, existing.created_at)
            }
            Some(existing) if !overwrite => {
                tracing::info!(document = name, "save as would overwrite an existing document");
                return Ok(SaveAsOutcome::NameCollision { existing });
            }
            Some(existing) => (existing.id, existing.created_at),
            None => (None, None),
        };

        let candidate = Document {
            id,
            name: Some(name.to_string()),
            content: self.document.content.clone(),
            created_at,
            updated_at: Some(chrono::Utc::now().timestamp_millis()),
        };

        let document = self.persist(candidate).await?.clone();
        Ok(SaveAsOutcome::Saved { document })
    }

    async fn persist(&mut self, candidate: Document) -> Result<&Document, SessionError> {
        let saved = self
            .store
            .save(&candidate)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, document = candidate.display_name(), "save failed"))?;

        tracing::info!(
            id = saved.id.as_deref().unwrap_or_default(),
            document = saved.display_name(),
            "saved document"
        );

        self.last_saved_content = candidate.content;
        self.document = Document {
            content: self.last_saved_content.clone(),
            ..saved
        };
        self.remember_open_document().await;

        Ok(&self.document)
    }

    /// Replace the open document with a blank one.
    ///
    /// Refused while dirty: the caller asks the user, then calls `discard` or
    /// `save` before trying again.
    pub async fn new_document(&mut self) -> Result<(), SessionError> {
        if self.is_dirty() {
            return Err(SessionError::UnsavedChanges);
        }

        self.document = Document::untitled();
        self.generation += 1;
        self.last_saved_content.clear();

        if let Err(e) = self.pointer.clear().await {
            tracing::warn!(error = %e, "failed to clear last opened document");
        }
        tracing::debug!("started new document");

        Ok(())
    }

    /// Make `document` the open one, clean. Unsaved work in the previous document
    /// is not checked here.
    pub async fn load(&mut self, document: Document) {
        self.last_saved_content.clone_from(&document.content);
        self.document = document;
        self.generation += 1;
        self.remember_open_document().await;

        tracing::debug!(document = self.document.display_name(), "loaded document");
    }

    /// Load a stored document by id
    pub async fn open(&mut self, id: &str) -> Result<&Document, SessionError> {
        let document = self
            .store
            .load_by_id(id)
            .await?
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;

        self.load(document).await;
        Ok(&self.document)
    }

    /// Reopen the document that was open when the last session ended, if it still exists
    pub async fn restore(&mut self) -> Result<Option<&Document>, SessionError> {
        let Some(id) = self.pointer.get().await? else {
            return Ok(None);
        };

        match self.store.load_by_id(&id).await? {
            Some(document) => {
                self.load(document).await;
                Ok(Some(&self.document))
            }
            None => {
                tracing::info!(id = %id, "last opened document no longer exists");
                self.pointer.clear().await?;
                Ok(None)
            }
        }
    }

    pub async fn list_documents(&self) -> Result<Vec<Document>, SessionError> {
        Ok(self.store.load_all().await?)
    }

    /// Delete a stored document. If it is the open one, the session keeps its
    /// content but no longer has a stored copy.
    pub async fn delete(&mut self, id: &str) -> Result<bool, SessionError> {
        let removed = self.store.delete_by_id(id).await?;

        if self.document.id.as_deref() == Some(id) {
            self.document.id = None;
            self.document.created_at = None;
            self.document.updated_at = None;
            self.last_saved_content.clear();

            if let Err(e) = self.pointer.clear().await {
                tracing::warn!(error = %e, "failed to clear last opened document");
            }
        }

        tracing::info!(id, removed, "deleted document");
        Ok(removed)
    }

    /// Export the live content
    pub fn export(&self, exporter: &dyn ContentExporter) -> Result<ExportArtifact, ExportError> {
        exporter.export(self.document.display_name(), &self.document.content)
    }

    async fn remember_open_document(&self) {
        let Some(id) = self.document.id.as_deref() else {
            return;
        };
        if let Err(e) = self.pointer.set(id).await {
            tracing::warn!(error = %e, id, "failed to remember last opened document");
        }
    }
}

/// Without a live editor, recognized text is appended as paragraphs
impl TextInserter for EditorSession {
    fn insert_text(&mut self, text: &str) {
        let paragraphs = text_to_paragraphs(text);
        if paragraphs.is_empty() {
            return;
        }
        let mut content = std::mem::take(&mut self.document.content);
        content.push_str(&paragraphs);
        self.edit(content);
    }
}
