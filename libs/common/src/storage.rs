//! Durable key-value storage for the B-Ticket client
//!
//! This module provides the string-keyed storage that the session layer
//! writes through to. `FileStore` keeps every entry in one JSON document on
//! disk so that a session survives restarts; `MemoryStore` is the volatile
//! counterpart used by tests and throwaway runs.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::error::{StorageError, StorageResult};

/// String-keyed durable storage
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Set a key-value pair, overwriting any previous value
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete a key. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check if the store is usable
    async fn health_check(&self) -> StorageResult<bool>;

    /// Drop every entry, including ones that can no longer be read
    async fn reset(&self) -> StorageResult<()>;
}

type Document = BTreeMap<String, String>;

/// Key-value store persisted as a single JSON document
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles on the document
    lock: Mutex<()>,
}

impl FileStore {
    /// Open a file store at the given path
    ///
    /// The file is created lazily on the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        info!("File store initialized at {}", path.display());
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> StorageResult<Document> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Document::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(StorageError::Corrupted),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Document::new()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    /// Path an unreadable document is moved to by `reset`
    pub fn quarantine_path(&self) -> PathBuf {
        self.path.with_extension("corrupt")
    }

    /// Write the document through a sibling temp file and rename it into
    /// place, so a crash never leaves a half-written store behind.
    async fn save(&self, document: &Document) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let bytes = serde_json::to_vec_pretty(document).map_err(StorageError::Serialization)?;
        let tmp_path = self.path.with_extension("tmp");
        tokio::fs::write(&tmp_path, bytes).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;

        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self.lock.lock().await;
        let document = self.load().await?;
        Ok(document.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self.lock.lock().await;
        let mut document = self.load().await?;
        document.insert(key.to_string(), value.to_string());
        self.save(&document).await?;
        debug!("Stored key {}", key);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let _guard = self.lock.lock().await;
        let mut document = self.load().await?;
        if document.remove(key).is_some() {
            self.save(&document).await?;
            debug!("Deleted key {}", key);
        }
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        let _guard = self.lock.lock().await;
        self.load().await?;
        Ok(true)
    }

    async fn reset(&self) -> StorageResult<()> {
        let _guard = self.lock.lock().await;

        if let Err(StorageError::Corrupted(e)) = self.load().await {
            let quarantine = self.quarantine_path();
            warn!(
                "Store document is unreadable ({}), moving it to {}",
                e,
                quarantine.display()
            );
            tokio::fs::rename(&self.path, &quarantine).await?;
        }

        self.save(&Document::new()).await?;
        info!("File store reset");
        Ok(())
    }
}

/// Volatile key-value store
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty memory store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        Ok(true)
    }

    async fn reset(&self) -> StorageResult<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_set_get_delete() -> StorageResult<()> {
        let store = MemoryStore::new();

        store.set("test_key", "test_value").await?;
        assert_eq!(store.get("test_key").await?, Some("test_value".to_string()));

        store.delete("test_key").await?;
        assert_eq!(store.get("test_key").await?, None);

        // Deleting twice is fine
        store.delete("test_key").await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() -> StorageResult<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("store.json");

        let store = FileStore::new(&path);
        assert!(store.health_check().await?);
        assert_eq!(store.get("missing").await?, None);

        store.set("@b_ticket_token", "abc").await?;
        store.set("@b_ticket_user", r#"{"id":1}"#).await?;

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("@b_ticket_token").await?, Some("abc".to_string()));
        assert_eq!(
            reopened.get("@b_ticket_user").await?,
            Some(r#"{"id":1}"#.to_string())
        );

        reopened.delete("@b_ticket_token").await?;
        assert_eq!(store.get("@b_ticket_token").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_file_store_reports_corruption() -> StorageResult<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("store.json");
        tokio::fs::write(&path, b"not json").await?;

        let store = FileStore::new(&path);
        assert!(matches!(
            store.get("anything").await,
            Err(StorageError::Corrupted(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_file_store_reset_quarantines_corrupted_document() -> StorageResult<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("store.json");
        tokio::fs::write(&path, b"{garbage").await?;

        let store = FileStore::new(&path);
        store.reset().await?;

        assert!(store.health_check().await?);
        store.set("@b_ticket_token", "fresh").await?;
        assert_eq!(store.get("@b_ticket_token").await?, Some("fresh".to_string()));
        assert_eq!(tokio::fs::read(store.quarantine_path()).await?, b"{garbage");
        Ok(())
    }

    #[tokio::test]
    async fn test_memory_store_reset_drops_entries() -> StorageResult<()> {
        let store = MemoryStore::new();
        store.set("a", "1").await?;
        store.reset().await?;
        assert_eq!(store.get("a").await?, None);
        Ok(())
    }
}
