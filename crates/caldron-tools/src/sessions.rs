//! Session-scoped store sets.

use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

use caldron_stores::{SnapshotStore, StoreNames, StoreSet, sanitize_session_id};

/// Hands out one shared [`StoreSet`] per session namespace.
///
/// Everything in a process that touches a session goes through the same
/// `StoreSet`, and therefore through the same per-store locks.
pub struct SessionStores {
    backend: Arc<dyn SnapshotStore>,
    names: StoreNames,
    /// Keyed by the sanitized namespace, not the raw id.
    sets: DashMap<String, Arc<StoreSet>>,
}

impl SessionStores {
    pub fn new(backend: Arc<dyn SnapshotStore>, names: StoreNames) -> Self {
        Self {
            backend,
            names,
            sets: DashMap::new(),
        }
    }

    pub fn with_default_names(backend: Arc<dyn SnapshotStore>) -> Self {
        Self::new(backend, StoreNames::default())
    }

    /// The store set for `session_id`, created on first use.
    pub fn for_session(&self, session_id: &str) -> Arc<StoreSet> {
        self.sets
            .entry(sanitize_session_id(session_id))
            .or_insert_with(|| {
                debug!("Opening stores for session '{}'", session_id);
                Arc::new(StoreSet::new(
                    self.backend.clone(),
                    session_id,
                    self.names.clone(),
                ))
            })
            .clone()
    }

    pub fn backend(&self) -> Arc<dyn SnapshotStore> {
        self.backend.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caldron_stores::{MemorySnapshotStore, PendingChange, PendingChangeQueue};

    #[test]
    fn test_same_session_same_set() {
        let sessions = SessionStores::with_default_names(Arc::new(MemorySnapshotStore::new()));
        let a = sessions.for_session("s1");
        let b = sessions.for_session("s1");
        let c = sessions.for_session("s2");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(c.session(), "s2");
    }

    #[tokio::test]
    async fn test_lookalike_ids_get_separate_namespaces() {
        let sessions = SessionStores::with_default_names(Arc::new(MemorySnapshotStore::new()));
        let slash = sessions.for_session("alice/1");
        let dot = sessions.for_session("alice.1");
        assert!(!Arc::ptr_eq(&slash, &dot));
        assert_ne!(slash.session(), dot.session());

        slash
            .mutate(|q: &mut PendingChangeQueue| q.suggest(PendingChange::new(3, None)))
            .await
            .unwrap();
        assert_eq!(dot.read(|q: &PendingChangeQueue| q.len()).await.unwrap(), 0);

        let again = sessions.for_session("alice/1");
        assert!(Arc::ptr_eq(&slash, &again));
        assert_eq!(again.read(|q: &PendingChangeQueue| q.len()).await.unwrap(), 1);
    }
}
