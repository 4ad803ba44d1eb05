//! # Caldron Workflow
//!
//! A [`WorkflowGraph`] wires task workers and routers together; once
//! compiled, an [`Orchestrator`] drives a conversation through it one
//! step at a time under a step budget.

pub mod error;
pub mod graph;
pub mod orchestrator;
pub mod scripted;

pub use error::{GraphBuildError, ScriptError};
pub use graph::{CompiledWorkflow, WorkflowGraph};
pub use orchestrator::{Orchestrator, RunOutcome, RunReport};
pub use scripted::{
    ScriptedCall, ScriptedRouter, ScriptedTaskWorker, StringRoute, WorkerSpec, WorkflowScript,
};
