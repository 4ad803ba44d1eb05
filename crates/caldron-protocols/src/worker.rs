//! Worker protocol definitions.
//!
//! Workers are the units of execution registered into a workflow graph.
//! A [`TaskWorker`] does work (usually through tools) and contributes one
//! message; a [`RouterWorker`] only chooses where control goes next.

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

use crate::error::WorkerError;
use crate::tool::{ToolCallOutcome, ToolContext, ToolDefinition};
use crate::types::ConversationState;

/// Boundary through which workers call tools.
///
/// Implementations never fail: every fault is folded into the outcome.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    async fn invoke(
        &self,
        tool_id: &str,
        params: serde_json::Value,
        ctx: &ToolContext,
    ) -> ToolCallOutcome;

    /// Definitions of every tool reachable through this invoker.
    fn available_tools(&self) -> Vec<ToolDefinition>;
}

/// Per-invocation context handed to a worker.
#[derive(Clone)]
pub struct WorkerContext {
    pub session_id: String,
    /// Zero-based index of the step being executed.
    pub step: u32,
    pub tools: Arc<dyn ToolInvoker>,
}

impl WorkerContext {
    pub fn new(session_id: impl Into<String>, step: u32, tools: Arc<dyn ToolInvoker>) -> Self {
        Self {
            session_id: session_id.into(),
            step,
            tools,
        }
    }

    /// Call a tool on behalf of `caller`.
    pub async fn call_tool(
        &self,
        caller: &str,
        tool_id: &str,
        params: serde_json::Value,
    ) -> ToolCallOutcome {
        let ctx = ToolContext::new(self.session_id.clone()).with_caller(caller);
        self.tools.invoke(tool_id, params, &ctx).await
    }
}

impl Debug for WorkerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerContext")
            .field("session_id", &self.session_id)
            .field("step", &self.step)
            .finish_non_exhaustive()
    }
}

/// A worker that acts and contributes exactly one message.
///
/// The returned string becomes a message authored by [`name`](Self::name);
/// the orchestrator appends it and records the sender.
#[async_trait]
pub trait TaskWorker: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    async fn invoke(
        &self,
        state: &ConversationState,
        ctx: &WorkerContext,
    ) -> Result<String, WorkerError>;
}

/// A closed set of routing labels.
///
/// Usually a fieldless enum. `all()` lists every variant, and each
/// variant's `label()` must be distinct.
pub trait RouteSet: Clone + Debug + Send + Sync + 'static {
    fn label(&self) -> &str;

    fn all() -> Vec<Self>;
}

/// A worker that only decides the next destination.
#[async_trait]
pub trait RouterWorker: Send + Sync {
    type Route: RouteSet;

    fn name(&self) -> &str;

    /// Routes this router may produce.
    fn routes(&self) -> Vec<Self::Route> {
        Self::Route::all()
    }

    async fn decide(
        &self,
        state: &ConversationState,
        ctx: &WorkerContext,
    ) -> Result<Self::Route, WorkerError>;
}

/// Resolve free text produced by a decision mechanism to a declared route.
pub fn parse_route<R: RouteSet>(
    worker: &str,
    label: &str,
    declared: &[R],
) -> Result<R, WorkerError> {
    let wanted = label.trim();
    declared
        .iter()
        .find(|r| r.label() == wanted)
        .cloned()
        .ok_or_else(|| WorkerError::UnknownRoute {
            worker: worker.to_string(),
            label: wanted.to_string(),
        })
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
