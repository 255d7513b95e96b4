use serde::{Deserialize, Serialize};

/// Name shown for a document that was never given one
pub const UNTITLED_DOCUMENT: &str = "Untitled Document";

/// A notepad document, either open in the editor or stored in the database
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unset until the document is first persisted
    pub id: Option<String>,
    pub name: Option<String>,
    pub content: String, // HTML fragment from the rich-text editor
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl Document {
    /// A blank, never-saved document
    pub fn untitled() -> Self {
        Self::default()
    }

    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => UNTITLED_DOCUMENT,
        }
    }

    /// Whether the document carries a usable name
    pub fn has_name(&self) -> bool {
        self.name.as_deref().is_some_and(|name| !name.trim().is_empty())
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_defaults_to_untitled() {
        let mut doc = Document::untitled();
        assert_eq!(doc.display_name(), UNTITLED_DOCUMENT);
        assert!(!doc.has_name());

        doc.name = Some("   ".to_string());
        assert_eq!(doc.display_name(), UNTITLED_DOCUMENT);
        assert!(!doc.has_name());

        doc.name = Some("Receipts".to_string());
        assert_eq!(doc.display_name(), "Receipts");
        assert!(doc.has_name());
    }

    #[test]
    fn test_untitled_is_not_persisted() {
        let doc = Document::untitled();
        assert!(!doc.is_persisted());
        assert!(doc.content.is_empty());
    }
}
