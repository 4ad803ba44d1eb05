//! Per-session load/mutate/save adapter over a [`SnapshotStore`].

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use caldron_config::StoresConfig;

use crate::backend::SnapshotStore;
use crate::changes::PendingChangeQueue;
use crate::error::StoreError;
use crate::graph::ResultGraph;
use crate::staging::StagingArea;

/// The three stores of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKind {
    Staging,
    Graph,
    Changes,
}

impl StoreKind {
    pub const ALL: [StoreKind; 3] = [StoreKind::Staging, StoreKind::Graph, StoreKind::Changes];

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Staging => "staging",
            StoreKind::Graph => "graph",
            StoreKind::Changes => "changes",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A store value that persists as one snapshot.
pub trait Snapshot: Serialize + DeserializeOwned + Default + Send + 'static {
    const KIND: StoreKind;
}

impl Snapshot for StagingArea {
    const KIND: StoreKind = StoreKind::Staging;
}

impl Snapshot for ResultGraph {
    const KIND: StoreKind = StoreKind::Graph;
}

impl Snapshot for PendingChangeQueue {
    const KIND: StoreKind = StoreKind::Changes;
}

/// Snapshot base names, one per store kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreNames {
    pub staging: String,
    pub graph: String,
    pub changes: String,
}

impl StoreNames {
    pub fn get(&self, kind: StoreKind) -> &str {
        match kind {
            StoreKind::Staging => &self.staging,
            StoreKind::Graph => &self.graph,
            StoreKind::Changes => &self.changes,
        }
    }
}

impl Default for StoreNames {
    fn default() -> Self {
        Self::from(&StoresConfig::default())
    }
}

impl From<&StoresConfig> for StoreNames {
    fn from(config: &StoresConfig) -> Self {
        Self {
            staging: config.staging_name.clone(),
            graph: config.graph_name.clone(),
            changes: config.changes_name.clone(),
        }
    }
}

/// The stores of one session.
///
/// Every operation is a whole-object read-modify-write against the backend.
/// Operations on the same store kind are serialized by a per-kind lock, so
/// concurrent callers sharing one `StoreSet` never lose updates. Separate
/// processes opening the same session are last-writer-wins.
pub struct StoreSet {
    backend: Arc<dyn SnapshotStore>,
    session: String,
    names: StoreNames,
    staging_lock: Mutex<()>,
    graph_lock: Mutex<()>,
    changes_lock: Mutex<()>,
}

impl StoreSet {
    pub fn new(backend: Arc<dyn SnapshotStore>, session_id: &str, names: StoreNames) -> Self {
        Self {
            backend,
            session: sanitize_session_id(session_id),
            names,
            staging_lock: Mutex::new(()),
            graph_lock: Mutex::new(()),
            changes_lock: Mutex::new(()),
        }
    }

    /// Sanitized session namespace.
    pub fn session(&self) -> &str {
        &self.session
    }

    pub fn snapshot_name(&self, kind: StoreKind) -> String {
        format!("{}.{}", self.session, self.names.get(kind))
    }

    fn lock(&self, kind: StoreKind) -> &Mutex<()> {
        match kind {
            StoreKind::Staging => &self.staging_lock,
            StoreKind::Graph => &self.graph_lock,
            StoreKind::Changes => &self.changes_lock,
        }
    }

    async fn load<T: Snapshot>(&self) -> Result<Option<T>, StoreError> {
        let name = self.snapshot_name(T::KIND);
        let Some(raw) = self.backend.load(&name).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("Corrupt snapshot '{}': {}", name, e);
                Err(e.into())
            }
        }
    }

    async fn save<T: Snapshot>(&self, value: &T) -> Result<(), StoreError> {
        let name = self.snapshot_name(T::KIND);
        let raw = serde_json::to_string_pretty(value)?;
        self.backend.save(&name, &raw).await
    }

    /// Load (or default-initialize) a store, mutate it, and save it back.
    pub async fn mutate<T, R, F>(&self, f: F) -> Result<R, StoreError>
    where
        T: Snapshot,
        F: FnOnce(&mut T) -> R + Send,
        R: Send,
    {
        let _guard = self.lock(T::KIND).lock().await;
        let mut value: T = self.load().await?.unwrap_or_default();
        let out = f(&mut value);
        self.save(&value).await?;
        debug!("Mutated {} store for session '{}'", T::KIND, self.session);
        Ok(out)
    }

    /// Read a store, default-initialized when it was never saved.
    pub async fn read<T, R, F>(&self, f: F) -> Result<R, StoreError>
    where
        T: Snapshot,
        F: FnOnce(&T) -> R + Send,
        R: Send,
    {
        let _guard = self.lock(T::KIND).lock().await;
        let value: T = self.load().await?.unwrap_or_default();
        Ok(f(&value))
    }

    /// Read a store that must already exist.
    pub async fn read_existing<T, R, F>(&self, f: F) -> Result<R, StoreError>
    where
        T: Snapshot,
        F: FnOnce(&T) -> R + Send,
        R: Send,
    {
        let _guard = self.lock(T::KIND).lock().await;
        let value: T = self
            .load()
            .await?
            .ok_or_else(|| StoreError::NotFound(self.snapshot_name(T::KIND)))?;
        Ok(f(&value))
    }

    /// Mutate the result graph and the change queue together.
    ///
    /// Locks are always taken graph first, then changes.
    pub async fn mutate_graph_and_changes<R, F>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut ResultGraph, &mut PendingChangeQueue) -> R + Send,
        R: Send,
    {
        let _graph_guard = self.graph_lock.lock().await;
        let _changes_guard = self.changes_lock.lock().await;
        let graph_name = self.snapshot_name(StoreKind::Graph);
        let previous_graph = self.backend.load(&graph_name).await?;
        let mut graph: ResultGraph = self.load().await?.unwrap_or_default();
        let mut changes: PendingChangeQueue = self.load().await?.unwrap_or_default();
        let out = f(&mut graph, &mut changes);
        self.save(&graph).await?;
        if let Err(e) = self.save(&changes).await {
            warn!(
                "Saving '{}' failed, rolling back '{}': {}",
                self.snapshot_name(StoreKind::Changes),
                graph_name,
                e
            );
            let rollback = match previous_graph {
                Some(raw) => self.backend.save(&graph_name, &raw).await,
                None => self.backend.delete(&graph_name).await.map(|_| ()),
            };
            if let Err(rollback_err) = rollback {
                warn!("Rollback of '{}' failed: {}", graph_name, rollback_err);
            }
            return Err(e);
        }
        Ok(out)
    }

    /// Whether a snapshot of this kind has been saved.
    pub async fn exists(&self, kind: StoreKind) -> Result<bool, StoreError> {
        let _guard = self.lock(kind).lock().await;
        Ok(self.backend.load(&self.snapshot_name(kind)).await?.is_some())
    }

    /// The stored snapshot text, as persisted.
    pub async fn raw_snapshot(&self, kind: StoreKind) -> Result<Option<String>, StoreError> {
        let _guard = self.lock(kind).lock().await;
        self.backend.load(&self.snapshot_name(kind)).await
    }

    /// Drop a store's snapshot entirely.
    pub async fn delete(&self, kind: StoreKind) -> Result<bool, StoreError> {
        let _guard = self.lock(kind).lock().await;
        self.backend.delete(&self.snapshot_name(kind)).await
    }
}

/// Map a session id onto a snapshot namespace.
///
/// ASCII letters, digits, `-` and `_` pass through; every other byte is
/// percent-encoded, so distinct ids always get distinct namespaces. The empty
/// id maps to `%`, which no encoding can produce.
pub fn sanitize_session_id(session_id: &str) -> String {
    if session_id.is_empty() {
        return "%".to_string();
    }
    let mut out = String::with_capacity(session_id.len());
    for byte in session_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

#[cfg(test)]
#[path = "store_set_tests.rs"]
mod tests;
