//! Startup configuration.
//!
//! Resolved once by [`NotepadConfig::from_env`] and passed into [`crate::bootstrap`];
//! nothing else reads the environment.

use std::path::PathBuf;

use crate::ocr::DEFAULT_OCR_LANGUAGE;

pub const DB_PATH_ENV: &str = "OCR_NOTEPAD_DB_PATH";
pub const OCR_LANGUAGE_ENV: &str = "OCR_NOTEPAD_OCR_LANGUAGE";

#[derive(Debug, Clone, PartialEq)]
pub struct NotepadConfig {
    pub database_path: PathBuf,
    pub ocr_language: String,
}

impl Default for NotepadConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            ocr_language: DEFAULT_OCR_LANGUAGE.to_string(),
        }
    }
}

impl NotepadConfig {
    /// Read configuration from the process environment, loading `.env` first if present
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let defaults = Self::default();
        Self {
            database_path: non_blank(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            ocr_language: non_blank(OCR_LANGUAGE_ENV)
                .map(|value| value.trim().to_string())
                .unwrap_or(defaults.ocr_language),
        }
    }
}

/// `<data dir>/ocr-notepad/notepad.db`, or the working directory when there is no data dir
pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ocr-notepad")
        .join("notepad.db")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = NotepadConfig::from_lookup(lookup(&[]));
        assert_eq!(config.ocr_language, "eng");
        assert!(config.database_path.ends_with("ocr-notepad/notepad.db"));
    }

    #[test]
    fn test_overrides() {
        let config = NotepadConfig::from_lookup(lookup(&[
            (DB_PATH_ENV, "/tmp/notes.db"),
            (OCR_LANGUAGE_ENV, " deu "),
        ]));
        assert_eq!(config.database_path, PathBuf::from("/tmp/notes.db"));
        assert_eq!(config.ocr_language, "deu");
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config = NotepadConfig::from_lookup(lookup(&[(OCR_LANGUAGE_ENV, "  ")]));
        assert_eq!(config.ocr_language, "eng");
    }
}
