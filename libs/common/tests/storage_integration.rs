//! Integration tests for the storage components
//!
//! These tests verify that a session written through the file store is
//! readable by a fresh store opened on the same path, the way the client
//! sees it after an app restart.

use common::storage::{FileStore, KeyValueStore, MemoryStore};
use std::sync::Arc;

/// Test that both store implementations honour the same contract when used
/// behind the trait object the client holds
#[tokio::test]
async fn test_storage_integration() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let stores: Vec<Arc<dyn KeyValueStore>> = vec![
        Arc::new(FileStore::new(dir.path().join("store.json"))),
        Arc::new(MemoryStore::new()),
    ];

    for store in stores {
        assert!(store.health_check().await?, "Storage health check failed");

        store.set("@b_ticket_token", "token-1").await?;
        store.set("@b_ticket_token", "token-2").await?;
        assert_eq!(
            store.get("@b_ticket_token").await?,
            Some("token-2".to_string()),
            "Overwrite did not replace the previous value"
        );

        store.delete("@b_ticket_token").await?;
        assert_eq!(store.get("@b_ticket_token").await?, None);
    }

    Ok(())
}

/// Concurrent writers must not lose each other's keys
#[tokio::test]
async fn test_file_store_concurrent_writes() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let store = Arc::new(FileStore::new(dir.path().join("store.json")));

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.set(&format!("key_{}", i), &i.to_string()).await
        }));
    }
    for handle in handles {
        handle.await??;
    }

    let reopened = FileStore::new(store.path());
    for i in 0..8 {
        assert_eq!(reopened.get(&format!("key_{}", i)).await?, Some(i.to_string()));
    }

    Ok(())
}
