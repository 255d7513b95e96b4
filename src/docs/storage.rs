use super::types::Document;
use crate::database::{Database, DbError};

const DOCUMENT_COLUMNS: &str = "id, name, content, created_at, updated_at";

fn document_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Document> {
    Ok(Document {
        id: Some(row.get(0)?),
        name: Some(row.get(1)?),
        content: row.get(2)?,
        created_at: Some(row.get(3)?),
        updated_at: Some(row.get(4)?),
    })
}

impl Database {
    /// Create the documents table
    pub fn create_docs_table(&self) -> Result<(), DbError> {
        let conn = self.conn.lock().map_err(|_| DbError::Lock)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                content TEXT NOT NULL DEFAULT '',
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_documents_updated_at
             ON documents(updated_at DESC)",
            [],
        )?;

        Ok(())
    }

    /// Insert or replace a document.
    ///
    /// A document without an id gets a fresh one. An existing row keeps its
    /// `created_at`; everything else is overwritten (last writer wins).
    pub fn save_document(&self, document: &Document) -> Result<Document, DbError> {
        let conn = self.conn.lock().map_err(|_| DbError::Lock)?;
        let now = chrono::Utc::now().timestamp_millis();

        let id = document
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let name = document.display_name();
        let created_at = document.created_at.unwrap_or(now);
        let updated_at = document.updated_at.unwrap_or(now).max(created_at);

        conn.execute(
            "INSERT INTO documents (id, name, content, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                content = excluded.content,
                updated_at = MAX(excluded.updated_at, documents.created_at)",
            rusqlite::params![id, name, document.content, created_at, updated_at],
        )?;

        let saved = conn.query_row(
            &format!("SELECT {} FROM documents WHERE id = ?1", DOCUMENT_COLUMNS),
            [&id],
            document_from_row,
        )?;

        Ok(saved)
    }

    /// Get a document by ID
    pub fn get_document(&self, id: &str) -> Result<Option<Document>, DbError> {
        let conn = self.conn.lock().map_err(|_| DbError::Lock)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM documents WHERE id = ?1",
            DOCUMENT_COLUMNS
        ))?;

        let mut rows = stmt.query([id])?;

        if let Some(row) = rows.next()? {
            Ok(Some(document_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// List all documents, ordered by updated_at desc
    pub fn list_documents(&self) -> Result<Vec<Document>, DbError> {
        let conn = self.conn.lock().map_err(|_| DbError::Lock)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM documents ORDER BY updated_at DESC",
            DOCUMENT_COLUMNS
        ))?;

        let rows = stmt.query_map([], document_from_row)?;

        let mut documents = Vec::new();
        for row in rows {
            documents.push(row?);
        }

        Ok(documents)
    }

    /// Delete a document by ID
    pub fn delete_document(&self, id: &str) -> Result<bool, DbError> {
        let conn = self.conn.lock().map_err(|_| DbError::Lock)?;

        let affected = conn.execute("DELETE FROM documents WHERE id = ?1", [id])?;

        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::UNTITLED_DOCUMENT;

    fn named(name: &str, content: &str) -> Document {
        Document {
            name: Some(name.to_string()),
            content: content.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_save_assigns_id_and_timestamps() {
        let db = Database::open_in_memory().unwrap();

        let saved = db.save_document(&named("Notes", "<p>a</p>")).unwrap();

        assert!(saved.id.is_some());
        assert_eq!(saved.name.as_deref(), Some("Notes"));
        assert_eq!(saved.content, "<p>a</p>");
        assert!(saved.updated_at >= saved.created_at);
    }

    #[test]
    fn test_save_without_name_uses_untitled() {
        let db = Database::open_in_memory().unwrap();

        let saved = db.save_document(&Document::untitled()).unwrap();
        assert_eq!(saved.name.as_deref(), Some(UNTITLED_DOCUMENT));

        let saved = db.save_document(&named("   ", "")).unwrap();
        assert_eq!(saved.name.as_deref(), Some(UNTITLED_DOCUMENT));
    }

    #[test]
    fn test_resave_keeps_created_at() {
        let db = Database::open_in_memory().unwrap();
        let first = db.save_document(&named("Notes", "<p>a</p>")).unwrap();

        let mut edited = first.clone();
        edited.content = "<p>b</p>".to_string();
        edited.created_at = Some(0);
        edited.updated_at = first.updated_at.map(|t| t + 10);
        let second = db.save_document(&edited).unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.content, "<p>b</p>");
        assert_eq!(db.list_documents().unwrap().len(), 1);
    }

    #[test]
    fn test_list_newest_first() {
        let db = Database::open_in_memory().unwrap();

        let mut older = named("Older", "");
        older.created_at = Some(100);
        older.updated_at = Some(100);
        let mut newer = named("Newer", "");
        newer.created_at = Some(100);
        newer.updated_at = Some(200);

        db.save_document(&older).unwrap();
        db.save_document(&newer).unwrap();

        let names: Vec<_> = db
            .list_documents()
            .unwrap()
            .into_iter()
            .filter_map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["Newer", "Older"]);
    }

    #[test]
    fn test_get_and_delete() {
        let db = Database::open_in_memory().unwrap();
        let saved = db.save_document(&named("Notes", "<p>a</p>")).unwrap();
        let id = saved.id.clone().unwrap();

        assert_eq!(db.get_document(&id).unwrap(), Some(saved));
        assert!(db.delete_document(&id).unwrap());
        assert!(!db.delete_document(&id).unwrap());
        assert_eq!(db.get_document(&id).unwrap(), None);
    }
}
