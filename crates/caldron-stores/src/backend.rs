//! Snapshot persistence.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

use caldron_config::{StoreBackend, StoresConfig};

use crate::error::StoreError;

/// Durable home for whole-object store snapshots.
///
/// Snapshots are opaque strings addressed by name.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load a snapshot. `None` when it was never saved.
    async fn load(&self, name: &str) -> Result<Option<String>, StoreError>;

    /// Save a snapshot, replacing any previous one.
    async fn save(&self, name: &str, snapshot: &str) -> Result<(), StoreError>;

    /// Delete a snapshot. Returns whether one existed.
    async fn delete(&self, name: &str) -> Result<bool, StoreError>;

    /// Names of stored snapshots starting with `prefix`, sorted.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

/// In-memory snapshot store for tests and ephemeral runs.
pub struct MemorySnapshotStore {
    snapshots: RwLock<HashMap<String, String>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self {
            snapshots: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self, name: &str) -> Result<Option<String>, StoreError> {
        Ok(self.snapshots.read().await.get(name).cloned())
    }

    async fn save(&self, name: &str, snapshot: &str) -> Result<(), StoreError> {
        self.snapshots
            .write()
            .await
            .insert(name.to_string(), snapshot.to_string());
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.snapshots.write().await.remove(name).is_some())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut names: Vec<String> = self
            .snapshots
            .read()
            .await
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        names.sort();
        Ok(names)
    }
}

/// File system snapshot store.
///
/// Each snapshot is one JSON file:
/// ```text
/// {root}/
/// ├── {name}.json
/// └── ...
/// ```
/// Writes go to `{name}.json.tmp` first and are renamed into place, so a
/// reader never sees a partially written snapshot.
pub struct FileSnapshotStore {
    root: PathBuf,
}

impl FileSnapshotStore {
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        debug!("FileSnapshotStore initialized at {:?}", root);
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn snapshot_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return Err(StoreError::Backend(format!(
                "invalid snapshot name '{}'",
                name
            )));
        }
        Ok(self.root.join(format!("{}.json", name)))
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load(&self, name: &str) -> Result<Option<String>, StoreError> {
        let path = self.snapshot_path(name)?;
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, name: &str, snapshot: &str) -> Result<(), StoreError> {
        let path = self.snapshot_path(name)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, snapshot).await?;
        fs::rename(&tmp, &path).await?;
        debug!("Saved snapshot '{}' to {:?}", name, path);
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<bool, StoreError> {
        let path = self.snapshot_path(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Deleted snapshot '{}'", name);
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if let Some(name) = file_name.strip_suffix(".json") {
                if name.starts_with(prefix) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Open the backend selected by configuration.
pub async fn open_backend(config: &StoresConfig) -> Result<Arc<dyn SnapshotStore>, StoreError> {
    match config.backend {
        StoreBackend::Memory => {
            info!("Using in-memory store backend");
            Ok(Arc::new(MemorySnapshotStore::new()))
        }
        StoreBackend::File => {
            info!("Using file store backend at {:?}", config.root);
            Ok(Arc::new(FileSnapshotStore::new(&config.root).await?))
        }
    }
}

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;
