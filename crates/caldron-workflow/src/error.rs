//! Workflow errors.

use thiserror::Error;

/// Problems found while compiling a [`WorkflowGraph`](crate::WorkflowGraph).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GraphBuildError {
    #[error("No entry worker set")]
    NoEntry,

    #[error("Unknown worker: {0}")]
    UnknownWorker(String),

    #[error("Worker registered twice: {0}")]
    DuplicateWorker(String),

    #[error("Worker '{0}' has no outgoing edge")]
    MissingEdge(String),

    #[error("Worker '{0}' has more than one outgoing edge")]
    ConflictingEdges(String),

    #[error("Worker '{worker}' is a {kind} and needs a {expected} edge")]
    EdgeKindMismatch {
        worker: String,
        kind: &'static str,
        expected: &'static str,
    },

    #[error("Unconditional cycle can never finish: {}", .0.join(" -> "))]
    UnconditionalCycle(Vec<String>),
}

/// Errors loading a workflow script.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Workflow script not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid workflow script: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid worker '{worker}': {message}")]
    InvalidWorker { worker: String, message: String },

    #[error(transparent)]
    Build(#[from] GraphBuildError),
}
