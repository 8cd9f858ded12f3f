//! Persistence collaborator: an opaque key/value store for document data.
//!
//! [`MemoryStore`] is volatile and lives as long as the process. [`FileStore`]
//! keeps one JSON file per id and honours the same contract.

use async_trait::async_trait;
use cardkit_core::{StoreError, ValidationError};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Result of a successful save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveReceipt {
    pub success: bool,
    pub id: String,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store `data` under `id`, replacing any previous value.
    async fn save(&self, id: &str, data: Value) -> Result<SaveReceipt, StoreError>;

    /// Fetch the value stored under `id`.
    async fn load(&self, id: &str) -> Result<Value, StoreError>;
}

fn check_request(id: &str, data: Option<&Value>) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        return Err(ValidationError::new("document id is required"));
    }
    if matches!(data, Some(Value::Null)) {
        return Err(ValidationError::new("document data is required"));
    }
    Ok(())
}

/// Process-wide volatile store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn save(&self, id: &str, data: Value) -> Result<SaveReceipt, StoreError> {
        check_request(id, Some(&data))?;
        self.entries.write().insert(id.to_string(), data);
        tracing::debug!(id, "stored document in memory");
        Ok(SaveReceipt {
            success: true,
            id: id.to_string(),
        })
    }

    async fn load(&self, id: &str) -> Result<Value, StoreError> {
        check_request(id, None)?;
        self.entries
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }
}

/// One `<id>.json` file per document inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// The directory is created on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, ValidationError> {
        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ValidationError::new(format!(
                "document id '{}' may only contain letters, digits, '-' and '_'",
                id
            )));
        }
        Ok(self.root.join(format!("{}.json", id)))
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn save(&self, id: &str, data: Value) -> Result<SaveReceipt, StoreError> {
        check_request(id, Some(&data))?;
        let path = self.path_for(id)?;
        let json = serde_json::to_vec_pretty(&data)?;

        tokio::fs::create_dir_all(&self.root).await?;
        // Write beside the target, then rename over it.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;

        tracing::info!("Stored document {} at {}", id, path.display());
        Ok(SaveReceipt {
            success: true,
            id: id.to_string(),
        })
    }

    async fn load(&self, id: &str) -> Result<Value, StoreError> {
        check_request(id, None)?;
        let path = self.path_for(id)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound { id: id.to_string() })
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }
}
