//! # Caldron Protocols
//!
//! Core protocol definitions (traits) for the Caldron orchestration engine.
//! Contains only interface definitions and shared value types.
//!
//! ## Core Traits
//!
//! - [`Tool`] - A named operation with a fixed input schema
//! - [`ToolInvoker`] - The boundary workers use to call tools
//! - [`TaskWorker`] - A worker that acts and appends one message
//! - [`RouterWorker`] - A worker that only picks the next destination

pub mod error;
pub mod tool;
pub mod types;
pub mod worker;

pub use error::{ToolError, WorkerError};
pub use tool::{Tool, ToolCallOutcome, ToolContext, ToolDefinition, ToolResult};
pub use types::*;
pub use worker::{RouteSet, RouterWorker, TaskWorker, ToolInvoker, WorkerContext, parse_route};
