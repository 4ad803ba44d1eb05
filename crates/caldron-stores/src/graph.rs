//! Versioned result graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use crate::document::ResultDocument;
use crate::error::GraphError;

/// A node of the result graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub document: ResultDocument,
    /// The node this one was derived from. `None` only for the root.
    pub parent: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl GraphNode {
    pub fn id(&self) -> Uuid {
        self.document.id()
    }
}

/// Compact view of the graph for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub current: Option<Uuid>,
    /// `(id, name)` in insertion order.
    pub nodes: Vec<(Uuid, String)>,
    /// `(from, to)`: `to` is derived from `from`.
    pub edges: Vec<(Uuid, Uuid)>,
}

/// Graph of result documents with one "current" node.
///
/// Every insertion after the root gets an edge from the node that was
/// current at the time, so each node has at most one parent and the graph
/// is always acyclic. `current` is `None` exactly when the graph is empty.
/// Loaded snapshots are checked against the same invariants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawResultGraph")]
pub struct ResultGraph {
    nodes: Vec<GraphNode>,
    current: Option<Uuid>,
}

/// Snapshot shape before invariant checks.
#[derive(Deserialize)]
struct RawResultGraph {
    nodes: Vec<GraphNode>,
    current: Option<Uuid>,
}

impl TryFrom<RawResultGraph> for ResultGraph {
    type Error = GraphError;

    fn try_from(raw: RawResultGraph) -> Result<Self, Self::Error> {
        let invalid = |msg: String| Err(GraphError::InvalidSnapshot(msg));

        let mut parents: HashMap<Uuid, Option<Uuid>> = HashMap::with_capacity(raw.nodes.len());
        for node in &raw.nodes {
            if parents.insert(node.id(), node.parent).is_some() {
                return invalid(format!("duplicate node {}", node.id()));
            }
        }

        match raw.current {
            None if !raw.nodes.is_empty() => {
                return invalid("non-empty graph has no current node".to_string());
            }
            Some(id) if !parents.contains_key(&id) => {
                return invalid(format!("current node {} does not exist", id));
            }
            _ => {}
        }

        for node in &raw.nodes {
            let mut next = node.parent;
            let mut hops = 0;
            while let Some(parent) = next {
                hops += 1;
                if hops > raw.nodes.len() {
                    return invalid(format!("parent links of {} form a cycle", node.id()));
                }
                next = match parents.get(&parent) {
                    Some(grandparent) => *grandparent,
                    None => {
                        return invalid(format!(
                            "node {} has missing parent {}",
                            node.id(),
                            parent
                        ));
                    }
                };
            }
        }

        Ok(Self {
            nodes: raw.nodes,
            current: raw.current,
        })
    }
}

impl ResultGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Establish the root. Only valid on an empty graph.
    pub fn create_with(&mut self, doc: ResultDocument) -> Result<Uuid, GraphError> {
        if !self.nodes.is_empty() {
            return Err(GraphError::AlreadyInitialized);
        }
        Ok(self.push(doc, None))
    }

    /// Add `doc` derived from the current node and make it current.
    pub fn add_version(&mut self, doc: ResultDocument) -> Result<Uuid, GraphError> {
        let parent = self.current.ok_or(GraphError::Empty)?;
        if self.contains(doc.id()) {
            return Err(GraphError::DuplicateDocument(doc.id()));
        }
        Ok(self.push(doc, Some(parent)))
    }

    /// Root on an empty graph, new version otherwise.
    pub fn insert(&mut self, doc: ResultDocument) -> Result<Uuid, GraphError> {
        if self.is_empty() {
            self.create_with(doc)
        } else {
            self.add_version(doc)
        }
    }

    fn push(&mut self, doc: ResultDocument, parent: Option<Uuid>) -> Uuid {
        let id = doc.id();
        debug!("Adding document {} to result graph (parent: {:?})", id, parent);
        self.nodes.push(GraphNode {
            document: doc,
            parent,
            created_at: Utc::now(),
        });
        self.current = Some(id);
        id
    }

    /// Document by id, or the current document when `id` is `None`.
    pub fn get(&self, id: Option<Uuid>) -> Option<&ResultDocument> {
        let id = id.or(self.current)?;
        self.node(id).map(|n| &n.document)
    }

    pub fn current(&self) -> Option<&ResultDocument> {
        self.get(None)
    }

    pub fn current_id(&self) -> Option<Uuid> {
        self.current
    }

    /// Re-point current to an existing node.
    pub fn set_current(&mut self, id: Uuid) -> Result<(), GraphError> {
        if !self.contains(id) {
            return Err(GraphError::NodeNotFound(id));
        }
        debug!("Result graph current -> {}", id);
        self.current = Some(id);
        Ok(())
    }

    /// Replace a node's document in place. The replacement must keep the id.
    pub fn replace(&mut self, doc: ResultDocument) -> Result<(), GraphError> {
        let id = doc.id();
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.id() == id)
            .ok_or(GraphError::NodeNotFound(id))?;
        node.document = doc;
        Ok(())
    }

    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.node(id).is_some()
    }

    pub fn node(&self, id: Uuid) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter()
    }

    /// All `(from, to)` derivation edges.
    pub fn edges(&self) -> Vec<(Uuid, Uuid)> {
        self.nodes
            .iter()
            .filter_map(|n| n.parent.map(|p| (p, n.id())))
            .collect()
    }

    /// Path from `id` back to the root, starting with `id` itself.
    pub fn lineage(&self, id: Uuid) -> Option<Vec<Uuid>> {
        let mut path = vec![id];
        let mut node = self.node(id)?;
        while let Some(parent) = node.parent {
            path.push(parent);
            node = self.node(parent)?;
        }
        Some(path)
    }

    /// Every node `id` was transitively derived from.
    pub fn ancestors(&self, id: Uuid) -> Vec<Uuid> {
        self.lineage(id)
            .map(|mut path| path.split_off(1))
            .unwrap_or_default()
    }

    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            current: self.current,
            nodes: self
                .nodes
                .iter()
                .map(|n| (n.id(), n.document.name.clone()))
                .collect(),
            edges: self.edges(),
        }
    }
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
