use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::types::StoreError;
use crate::database::{Database, DbError};
use crate::docs::Document;

/// Where documents are persisted.
///
/// Documents are keyed by an opaque id. Names are not unique. Concurrent writers
/// resolve last-writer-wins.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist a document, assigning an id when it has none. Returns the stored copy.
    async fn save(&self, document: &Document) -> Result<Document, StoreError>;

    /// All documents, most recently updated first
    async fn load_all(&self) -> Result<Vec<Document>, StoreError>;

    async fn load_by_id(&self, id: &str) -> Result<Option<Document>, StoreError>;

    /// Returns whether a document was removed
    async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError>;

    /// First stored document whose name matches exactly
    async fn find_by_name(&self, name: &str) -> Result<Option<Document>, StoreError> {
        let documents = self.load_all().await?;
        Ok(documents
            .into_iter()
            .find(|doc| doc.name.as_deref() == Some(name)))
    }
}

/// SQLite-backed store and last-opened pointer. Queries run on the blocking pool.
#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<Database>,
}

impl SqliteStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub(crate) async fn run<T, F>(&self, query: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T, DbError> + Send + 'static,
    {
        let db = self.db.clone();
        let result = tokio::task::spawn_blocking(move || query(db.as_ref()))
            .await
            .map_err(|e| StoreError::Join(e.to_string()))??;
        Ok(result)
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn save(&self, document: &Document) -> Result<Document, StoreError> {
        let document = document.clone();
        self.run(move |db| db.save_document(&document)).await
    }

    async fn load_all(&self) -> Result<Vec<Document>, StoreError> {
        self.run(|db| db.list_documents()).await
    }

    async fn load_by_id(&self, id: &str) -> Result<Option<Document>, StoreError> {
        let id = id.to_string();
        self.run(move |db| db.get_document(&id)).await
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError> {
        let id = id.to_string();
        self.run(move |db| db.delete_document(&id)).await
    }
}

/// Store kept entirely in memory
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn save(&self, document: &Document) -> Result<Document, StoreError> {
        let mut documents = self.documents.lock().map_err(|_| DbError::Lock)?;
        let now = chrono::Utc::now().timestamp_millis();

        let id = document
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let created_at = documents
            .get(&id)
            .and_then(|existing| existing.created_at)
            .or(document.created_at)
            .unwrap_or(now);

        let stored = Document {
            id: Some(id.clone()),
            name: Some(document.display_name().to_string()),
            content: document.content.clone(),
            created_at: Some(created_at),
            updated_at: Some(document.updated_at.unwrap_or(now).max(created_at)),
        };
        documents.insert(id, stored.clone());

        Ok(stored)
    }

    async fn load_all(&self) -> Result<Vec<Document>, StoreError> {
        let documents = self.documents.lock().map_err(|_| DbError::Lock)?;

        let mut all: Vec<Document> = documents.values().cloned().collect();
        all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        Ok(all)
    }

    async fn load_by_id(&self, id: &str) -> Result<Option<Document>, StoreError> {
        let documents = self.documents.lock().map_err(|_| DbError::Lock)?;
        Ok(documents.get(id).cloned())
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError> {
        let mut documents = self.documents.lock().map_err(|_| DbError::Lock)?;
        Ok(documents.remove(id).is_some())
    }
}

/// Stand-in used when the real store failed to start. Every call fails, so
/// editing keeps working while saving and loading report the reason.
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> StoreError {
        StoreError::Unavailable(self.reason.clone())
    }
}

#[async_trait]
impl DocumentStore for UnavailableStore {
    async fn save(&self, _document: &Document) -> Result<Document, StoreError> {
        Err(self.error())
    }

    async fn load_all(&self) -> Result<Vec<Document>, StoreError> {
        Err(self.error())
    }

    async fn load_by_id(&self, _id: &str) -> Result<Option<Document>, StoreError> {
        Err(self.error())
    }

    async fn delete_by_id(&self, _id: &str) -> Result<bool, StoreError> {
        Err(self.error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Document {
        Document {
            name: Some(name.to_string()),
            content: format!("<p>{}</p>", name),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_memory_store_save_and_load() {
        let store = MemoryStore::new();

        let saved = store.save(&named("a")).await.unwrap();
        let id = saved.id.clone().unwrap();

        assert_eq!(store.load_by_id(&id).await.unwrap(), Some(saved));
        assert!(store.delete_by_id(&id).await.unwrap());
        assert_eq!(store.load_by_id(&id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_keeps_created_at() {
        let store = MemoryStore::new();
        let first = store.save(&named("a")).await.unwrap();

        let mut again = first.clone();
        again.created_at = None;
        again.updated_at = None;
        let second = store.save(&again).await.unwrap();

        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= second.created_at);
    }

    #[tokio::test]
    async fn test_find_by_name_is_exact() {
        let store = MemoryStore::new();
        store.save(&named("Notes")).await.unwrap();

        assert!(store.find_by_name("Notes").await.unwrap().is_some());
        assert!(store.find_by_name("notes").await.unwrap().is_none());
        assert!(store.find_by_name("Notes ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_database_store_lists_newest_first() {
        let db = SqliteStore::new(Arc::new(Database::open_in_memory().unwrap()));

        let mut old = named("old");
        old.updated_at = Some(1);
        old.created_at = Some(1);
        db.save(&old).await.unwrap();
        db.save(&named("new")).await.unwrap();

        let all = db.load_all().await.unwrap();
        assert_eq!(all[0].name.as_deref(), Some("new"));
        assert_eq!(all[1].name.as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn test_stores_agree_on_blank_names() {
        let memory = MemoryStore::new();
        let db = SqliteStore::new(Arc::new(Database::open_in_memory().unwrap()));

        for name in [None, Some(""), Some("  "), Some("Notes")] {
            let document = Document {
                name: name.map(str::to_string),
                ..Default::default()
            };
            let in_memory = memory.save(&document).await.unwrap();
            let on_disk = db.save(&document).await.unwrap();
            assert_eq!(in_memory.name, on_disk.name, "name {:?}", name);
        }
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_every_call() {
        let store = UnavailableStore::new("disk full");

        assert!(matches!(
            store.save(&named("a")).await,
            Err(StoreError::Unavailable(reason)) if reason == "disk full"
        ));
        assert!(store.load_all().await.is_err());
        assert!(store.load_by_id("x").await.is_err());
        assert!(store.delete_by_id("x").await.is_err());
        assert!(store.find_by_name("a").await.is_err());
    }
}
