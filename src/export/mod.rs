//! Export of the live document content.
//!
//! Exporters only read content; nothing they produce flows back into the
//! save-state of the session.

use serde::{Deserialize, Serialize};

use crate::content::escape_html;
use crate::docs::UNTITLED_DOCUMENT;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Export failed: {0}")]
    Failed(String),
}

/// A produced file, ready to hand to the user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

pub trait ContentExporter: Send + Sync {
    /// Produce an artifact from a document name and its live HTML content
    fn export(&self, name: &str, content: &str) -> Result<ExportArtifact, ExportError>;
}

/// Wraps the fragment in a standalone HTML page
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlExporter;

impl ContentExporter for HtmlExporter {
    fn export(&self, name: &str, content: &str) -> Result<ExportArtifact, ExportError> {
        let page = format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
            escape_html(name),
            content
        );

        Ok(ExportArtifact {
            file_name: format!("{}.html", file_stem(name)),
            mime_type: "text/html".to_string(),
            bytes: page.into_bytes(),
        })
    }
}

/// Document name made safe for use as a file name
pub fn file_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            ch if ch.is_control() => '_',
            ch => ch,
        })
        .collect();

    if stem.trim_matches(|c| c == '_' || c == '.').is_empty() {
        UNTITLED_DOCUMENT.to_string()
    } else {
        stem
    }
}
