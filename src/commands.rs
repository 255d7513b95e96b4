use crate::database::{Database, DbError};
use crate::docs::Document;
use crate::export::{ExportArtifact, ExportError, HtmlExporter};
use crate::ocr::{self, ImagePayload, OcrCapture, OcrError, Recognition};
use crate::session::{EditorSession, SaveAsOutcome, SaveState, SessionError};
use crate::settings::Preferences;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct AppState {
    /// `None` when the database could not be opened
    pub db: Option<Arc<Database>>,
    pub session: Mutex<EditorSession>,
    pub ocr: Option<OcrCapture>,
    pub preferences: Mutex<Preferences>,
}

#[derive(Debug, Serialize)]
pub struct CommandError {
    message: String,
}

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        CommandError {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<SessionError> for CommandError {
    fn from(e: SessionError) -> Self {
        CommandError {
            message: e.to_string(),
        }
    }
}

impl From<DbError> for CommandError {
    fn from(e: DbError) -> Self {
        CommandError {
            message: e.to_string(),
        }
    }
}

impl From<OcrError> for CommandError {
    fn from(e: OcrError) -> Self {
        CommandError {
            message: e.to_string(),
        }
    }
}

impl From<ExportError> for CommandError {
    fn from(e: ExportError) -> Self {
        CommandError {
            message: e.to_string(),
        }
    }
}

/// What the editor chrome needs to render: title, unsaved marker, save button
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionStatus {
    pub id: Option<String>,
    pub name: String,
    pub save_state: SaveState,
    pub can_save: bool,
}

impl SessionStatus {
    fn of(session: &EditorSession) -> Self {
        let document = session.document();
        SessionStatus {
            id: document.id.clone(),
            name: document.display_name().to_string(),
            save_state: session.save_state(),
            can_save: session.can_save(),
        }
    }
}

// Session commands
pub async fn get_session_status(state: &AppState) -> SessionStatus {
    SessionStatus::of(&*state.session.lock().await)
}

pub async fn edit_document(state: &AppState, content: String) -> SessionStatus {
    let mut session = state.session.lock().await;
    session.edit(content);
    SessionStatus::of(&session)
}

pub async fn save_document(state: &AppState) -> Result<Document, CommandError> {
    let mut session = state.session.lock().await;
    Ok(session.save().await?.clone())
}

pub async fn save_document_as(
    state: &AppState,
    name: String,
    overwrite: bool,
) -> Result<SaveAsOutcome, CommandError> {
    let mut session = state.session.lock().await;
    Ok(session.save_as(&name, overwrite).await?)
}

/// Returns the content the editor should display afterwards
pub async fn discard_changes(state: &AppState) -> String {
    let mut session = state.session.lock().await;
    session.discard().to_string()
}

pub async fn new_document(state: &AppState) -> Result<SessionStatus, CommandError> {
    let mut session = state.session.lock().await;
    session.new_document().await?;
    Ok(SessionStatus::of(&session))
}

/// Switch to a stored document. Refused while the open one has unsaved changes,
/// unless the user chose to discard them.
pub async fn open_document(
    state: &AppState,
    id: String,
    discard_unsaved: bool,
) -> Result<Document, CommandError> {
    let mut session = state.session.lock().await;
    if session.is_dirty() && !discard_unsaved {
        return Err(SessionError::UnsavedChanges.into());
    }
    Ok(session.open(&id).await?.clone())
}

pub async fn restore_last_document(state: &AppState) -> Result<Option<Document>, CommandError> {
    let mut session = state.session.lock().await;
    Ok(session.restore().await?.cloned())
}

// Document commands
pub async fn list_documents(state: &AppState) -> Result<Vec<Document>, CommandError> {
    let session = state.session.lock().await;
    Ok(session.list_documents().await?)
}

pub async fn delete_document(state: &AppState, id: String) -> Result<bool, CommandError> {
    let mut session = state.session.lock().await;
    Ok(session.delete(&id).await?)
}

pub async fn export_html(state: &AppState) -> Result<ExportArtifact, CommandError> {
    let session = state.session.lock().await;
    Ok(session.export(&HtmlExporter)?)
}

// Preference commands
pub async fn get_preferences(state: &AppState) -> Preferences {
    state.preferences.lock().await.clone()
}

pub async fn set_auto_paste_ocr(state: &AppState, enabled: bool) -> Result<Preferences, CommandError> {
    let mut preferences = state.preferences.lock().await;
    let updated = Preferences {
        auto_paste_ocr: enabled,
    };

    if let Some(db) = &state.db {
        db.save_preferences(&updated)?;
    }
    *preferences = updated.clone();

    tracing::debug!(enabled, "auto paste OCR preference changed");
    Ok(updated)
}

// OCR commands

/// Run OCR on a pasted, dropped or captured item. Non-image items are ignored.
/// With auto paste on, the text is appended to the document that was open when
/// the capture started, and dropped if another document was opened meanwhile.
pub async fn recognize_image(
    state: &AppState,
    mime_type: String,
    bytes: Vec<u8>,
) -> Result<Option<Recognition>, CommandError> {
    let Some(image) = ImagePayload::from_clipboard(&mime_type, bytes) else {
        return Ok(None);
    };
    let capture = state
        .ocr
        .as_ref()
        .ok_or_else(|| CommandError::new("OCR engine is not configured"))?;

    let generation = state.session.lock().await.generation();

    // Recognition can be slow; the session stays unlocked meanwhile
    let mut recognition = capture.capture(&image, None).await?;

    if state.preferences.lock().await.auto_paste_ocr {
        let mut session = state.session.lock().await;
        if session.generation() == generation {
            recognition.inserted = ocr::deliver(&recognition.text, &mut *session);
        } else {
            tracing::info!("open document changed during recognition, text not inserted");
        }
    }

    Ok(Some(recognition))
}
