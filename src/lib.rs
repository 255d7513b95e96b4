pub mod commands;
pub mod config;
pub mod content;
pub mod database;
pub mod docs;
pub mod export;
pub mod ocr;
pub mod session;
pub mod settings;

pub use commands::{AppState, CommandError, SessionStatus};
pub use config::NotepadConfig;
pub use content::{is_content_equivalent, normalize, NormalizedFragment};
pub use docs::Document;
pub use session::{EditorSession, SaveAsOutcome, SaveState, SessionError};

use database::Database;
use ocr::{OcrCapture, TextRecognizer};
use session::{DocumentStore, LastOpenedPointer, MemoryPointer, SqliteStore, UnavailableStore};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the default log subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ocr_notepad=info"));

    // A subscriber installed by the host application wins
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Build the application state.
///
/// If the database cannot be opened the notepad still starts: editing works,
/// while saving and loading report the startup failure.
pub fn bootstrap(config: &NotepadConfig, recognizer: Option<Arc<dyn TextRecognizer>>) -> AppState {
    let (db, store, pointer): (Option<Arc<Database>>, Arc<dyn DocumentStore>, Arc<dyn LastOpenedPointer>) =
        match Database::open(&config.database_path) {
            Ok(db) => {
                let db = Arc::new(db);
                let store = Arc::new(SqliteStore::new(db.clone()));
                (
                    Some(db),
                    store.clone() as Arc<dyn DocumentStore>,
                    store as Arc<dyn LastOpenedPointer>,
                )
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    path = %config.database_path.display(),
                    "failed to open document storage, continuing without persistence"
                );
                (
                    None,
                    Arc::new(UnavailableStore::new(e.to_string())) as Arc<dyn DocumentStore>,
                    Arc::new(MemoryPointer::new()) as Arc<dyn LastOpenedPointer>,
                )
            }
        };

    let preferences = db
        .as_ref()
        .and_then(|db| {
            db.get_preferences()
                .inspect_err(|e| tracing::warn!(error = %e, "failed to read preferences"))
                .ok()
        })
        .unwrap_or_default();

    AppState {
        db,
        session: Mutex::new(EditorSession::new(store, pointer)),
        ocr: recognizer.map(|recognizer| OcrCapture::new(recognizer, config.ocr_language.clone())),
        preferences: Mutex::new(preferences),
    }
}
