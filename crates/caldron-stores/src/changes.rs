//! Priority queue of pending edits to the current result document.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::{debug, warn};
use uuid::Uuid;

use caldron_config::ApplyPolicy;

use crate::document::DocumentEdit;
use crate::error::ApplyError;
use crate::graph::ResultGraph;

/// A proposed edit. Lower `priority` values are more urgent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingChange {
    pub id: Uuid,
    pub priority: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit: Option<DocumentEdit>,
}

impl PendingChange {
    pub fn new(priority: i64, edit: Option<DocumentEdit>) -> Self {
        Self {
            id: Uuid::new_v4(),
            priority,
            edit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct QueuedChange {
    change: PendingChange,
    /// Insertion order, used to break priority ties.
    seq: u64,
}

/// Heap ordering: the most urgent change is the greatest.
#[derive(Debug, Clone)]
struct Ranked(QueuedChange);

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        // Lower priority value first, then earlier suggestion.
        other
            .0
            .change
            .priority
            .cmp(&self.0.change.priority)
            .then_with(|| other.0.seq.cmp(&self.0.seq))
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct QueueSnapshot {
    next_seq: u64,
    changes: Vec<QueuedChange>,
}

/// Pending changes, exposed only in priority order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "QueueSnapshot", into = "QueueSnapshot")]
pub struct PendingChangeQueue {
    heap: BinaryHeap<Ranked>,
    next_seq: u64,
}

impl From<QueueSnapshot> for PendingChangeQueue {
    fn from(snapshot: QueueSnapshot) -> Self {
        Self {
            heap: snapshot.changes.into_iter().map(Ranked).collect(),
            next_seq: snapshot.next_seq,
        }
    }
}

impl From<PendingChangeQueue> for QueueSnapshot {
    fn from(queue: PendingChangeQueue) -> Self {
        let next_seq = queue.next_seq;
        Self {
            next_seq,
            changes: queue.ordered().into_iter().map(|r| r.0).collect(),
        }
    }
}

impl PendingChangeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a change and return its id.
    pub fn suggest(&mut self, change: PendingChange) -> Uuid {
        let id = change.id;
        let seq = self.next_seq;
        self.next_seq += 1;
        debug!("Suggesting change {} (priority {})", id, change.priority);
        self.heap.push(Ranked(QueuedChange { change, seq }));
        id
    }

    fn ordered(&self) -> Vec<Ranked> {
        let mut all = self.heap.clone().into_sorted_vec();
        all.reverse();
        all
    }

    /// Changes, most urgent first.
    pub fn list(&self) -> Vec<PendingChange> {
        self.ordered().into_iter().map(|r| r.0.change).collect()
    }

    pub fn peek(&self) -> Option<&PendingChange> {
        self.heap.peek().map(|r| &r.0.change)
    }

    pub fn get(&self, id: Uuid) -> Option<&PendingChange> {
        self.heap
            .iter()
            .map(|r| &r.0.change)
            .find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Pop the most urgent change and merge it into the current document.
    ///
    /// Returns the change (if one was popped) and whether the merge took
    /// effect. With no current document nothing is popped. A change that
    /// fails to merge is still consumed and the graph is left untouched.
    pub fn apply(
        &mut self,
        graph: &mut ResultGraph,
        policy: ApplyPolicy,
    ) -> (Option<PendingChange>, bool) {
        let Some(current) = graph.current().cloned() else {
            debug!("No current document; leaving {} change(s) queued", self.len());
            return (None, false);
        };
        let Some(Ranked(queued)) = self.heap.pop() else {
            return (None, false);
        };
        let change = queued.change;

        let merged = change
            .edit
            .as_ref()
            .ok_or(ApplyError::EmptyChange)
            .and_then(|edit| current.apply_edit(edit));

        let edited = match merged {
            Ok(doc) => doc,
            Err(e) => {
                warn!("Change {} could not be applied: {}", change.id, e);
                return (Some(change), false);
            }
        };

        let stored = match policy {
            ApplyPolicy::Versioned => graph.add_version(edited.with_new_id()).map(|_| ()),
            ApplyPolicy::InPlace => graph.replace(edited),
        };
        match stored {
            Ok(()) => {
                debug!("Applied change {} ({:?})", change.id, policy);
                (Some(change), true)
            }
            Err(e) => {
                warn!("Change {} merged but not stored: {}", change.id, e);
                (Some(change), false)
            }
        }
    }

    /// Give a queued change a new priority. Its tie-break position is kept.
    pub fn reprioritize(&mut self, id: Uuid, priority: i64) -> bool {
        let mut entries = std::mem::take(&mut self.heap).into_vec();
        let found = match entries.iter_mut().find(|r| r.0.change.id == id) {
            Some(entry) => {
                entry.0.change.priority = priority;
                true
            }
            None => false,
        };
        self.heap = BinaryHeap::from(entries);
        found
    }

    /// Drop a queued change.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.heap.len();
        self.heap.retain(|r| r.0.change.id != id);
        self.heap.len() != before
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

#[cfg(test)]
#[path = "changes_tests.rs"]
mod tests;
