use cardkit_core::{Error, StoreError};
use cardkit_designer::{DesignerState, DocumentStore, FileStore, LayerNode, MemoryStore};
use serde_json::json;
use tempfile::TempDir;

#[tokio::test]
async fn test_memory_store_round_trip() {
    let store = MemoryStore::new();
    let receipt = store.save("card-1", json!({"name": "A"})).await.unwrap();
    assert!(receipt.success);
    assert_eq!(receipt.id, "card-1");
    assert_eq!(store.load("card-1").await.unwrap()["name"], "A");
}

#[tokio::test]
async fn test_requests_validated_before_mutation() {
    let store = MemoryStore::new();
    assert!(matches!(
        store.save("", json!({})).await,
        Err(StoreError::Validation(_))
    ));
    assert!(matches!(
        store.save("x", serde_json::Value::Null).await,
        Err(StoreError::Validation(_))
    ));
    assert!(store.is_empty());
    assert!(matches!(
        store.load("nope").await,
        Err(StoreError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_file_store_persists_across_instances() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("designs");

    FileStore::new(&root)
        .save("abc_123", json!({"layers": []}))
        .await
        .unwrap();
    assert!(root.join("abc_123.json").exists());

    let reopened = FileStore::new(&root);
    assert_eq!(reopened.load("abc_123").await.unwrap(), json!({"layers": []}));
    assert!(matches!(
        reopened.load("missing").await,
        Err(StoreError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_file_store_rejects_path_ids() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path());
    assert!(matches!(
        store.save("../escape", json!({})).await,
        Err(StoreError::Validation(_))
    ));
}

#[tokio::test]
async fn test_designer_state_save_and_reopen() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path());

    let mut state = DesignerState::new();
    state.add_layer(LayerNode::text("Jane", 10.0, 10.0)).unwrap();
    let receipt = state.save_to_store(&store).await.unwrap();
    assert!(receipt.success);
    assert!(!state.is_modified);
    let saved = state.document().clone();

    let mut other = DesignerState::new();
    other.open_from_store(&store, &saved.id).await.unwrap();
    assert_eq!(other.document(), &saved);
    assert!(!other.can_undo());

    let err = other.open_from_store(&store, "unknown").await.unwrap_err();
    assert!(matches!(err, Error::Store(StoreError::NotFound { .. })));
    assert_eq!(other.document(), &saved);
}
