use async_trait::async_trait;
use std::sync::Mutex;

use super::store::SqliteStore;
use super::types::StoreError;
use crate::database::DbError;

const LAST_OPENED_KEY: &str = "last_opened_document_id";

/// Remembers which document was open so the next session can reopen it
#[async_trait]
pub trait LastOpenedPointer: Send + Sync {
    async fn get(&self) -> Result<Option<String>, StoreError>;
    async fn set(&self, id: &str) -> Result<(), StoreError>;
    async fn clear(&self) -> Result<(), StoreError>;
}

#[async_trait]
impl LastOpenedPointer for SqliteStore {
    async fn get(&self) -> Result<Option<String>, StoreError> {
        self.run(|db| db.get_value(LAST_OPENED_KEY)).await
    }

    async fn set(&self, id: &str) -> Result<(), StoreError> {
        let id = id.to_string();
        self.run(move |db| db.set_value(LAST_OPENED_KEY, &id)).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.run(|db| db.delete_value(LAST_OPENED_KEY)).await
    }
}

/// Pointer that lives only as long as the process
#[derive(Default)]
pub struct MemoryPointer {
    id: Mutex<Option<String>>,
}

impl MemoryPointer {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LastOpenedPointer for MemoryPointer {
    async fn get(&self) -> Result<Option<String>, StoreError> {
        Ok(self.id.lock().map_err(|_| DbError::Lock)?.clone())
    }

    async fn set(&self, id: &str) -> Result<(), StoreError> {
        *self.id.lock().map_err(|_| DbError::Lock)? = Some(id.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.id.lock().map_err(|_| DbError::Lock)? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_database_pointer() {
        let store = SqliteStore::new(Arc::new(Database::open_in_memory().unwrap()));

        assert_eq!(store.get().await.unwrap(), None);
        store.set("doc-1").await.unwrap();
        assert_eq!(store.get().await.unwrap().as_deref(), Some("doc-1"));
        store.clear().await.unwrap();
        assert_eq!(store.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_pointer() {
        let pointer = MemoryPointer::new();

        pointer.set("a").await.unwrap();
        pointer.set("b").await.unwrap();
        assert_eq!(pointer.get().await.unwrap().as_deref(), Some("b"));

        pointer.clear().await.unwrap();
        assert_eq!(pointer.get().await.unwrap(), None);
    }
}
