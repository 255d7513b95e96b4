use serde::{Deserialize, Serialize};

use crate::database::{Database, DbError};

const PREFERENCES_KEY: &str = "preferences";

/// User preferences that survive restarts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Insert recognized text into the editor as soon as OCR finishes
    #[serde(default)]
    pub auto_paste_ocr: bool,
}

impl Database {
    /// Stored preferences, or defaults when none are stored or they are unreadable
    pub fn get_preferences(&self) -> Result<Preferences, DbError> {
        let Some(raw) = self.get_value(PREFERENCES_KEY)? else {
            return Ok(Preferences::default());
        };

        Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring unreadable preferences");
            Preferences::default()
        }))
    }

    pub fn save_preferences(&self, preferences: &Preferences) -> Result<(), DbError> {
        let raw = serde_json::to_string(preferences).unwrap_or_else(|_| "{}".to_string());
        self.set_value(PREFERENCES_KEY, &raw)
    }
}
