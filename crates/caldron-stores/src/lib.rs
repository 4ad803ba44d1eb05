//! # Caldron Stores
//!
//! The three stores workers read and mutate during a run:
//!
//! - [`StagingArea`] - scratch references and draft documents, FIFO
//! - [`ResultGraph`] - versioned documents with a "current" pointer
//! - [`PendingChangeQueue`] - proposed edits, most urgent first
//!
//! Snapshots persist through a [`SnapshotStore`]; [`StoreSet`] scopes them
//! to a session and serializes read-modify-write per store.

pub mod backend;
pub mod changes;
pub mod document;
pub mod error;
pub mod graph;
pub mod staging;
pub mod store_set;

pub use backend::{FileSnapshotStore, MemorySnapshotStore, SnapshotStore, open_backend};
pub use changes::{PendingChange, PendingChangeQueue};
pub use document::{DocumentEdit, Ingredient, ResultDocument};
pub use error::{DocumentError, GraphError, StagingError, StoreError};
pub use graph::{GraphNode, GraphSummary, ResultGraph};
pub use staging::StagingArea;
pub use store_set::{Snapshot, StoreKind, StoreNames, StoreSet, sanitize_session_id};
