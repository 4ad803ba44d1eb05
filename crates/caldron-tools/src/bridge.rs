//! The boundary between workers and tools.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use caldron_protocols::error::ToolError;
use caldron_protocols::tool::{ToolCallOutcome, ToolContext, ToolDefinition, ToolResult};
use caldron_protocols::worker::ToolInvoker;

use crate::registry::ToolRegistry;

/// Looks tools up, validates their input and runs them.
///
/// Nothing escapes `call`: a missing tool, bad parameters, a store fault or
/// a timeout all come back as a failed [`ToolCallOutcome`] and a warning in
/// the log.
///
/// A read-only bridge refuses tools whose definition is marked
/// `mutates_store`, which makes it safe to hand to an observer.
pub struct ToolBridge {
    registry: Arc<ToolRegistry>,
    timeout: Option<Duration>,
    read_only: bool,
}

impl ToolBridge {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            timeout: None,
            read_only: false,
        }
    }

    /// Bound every tool execution.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Refuse every store-writing tool.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub async fn call(
        &self,
        tool_id: &str,
        params: serde_json::Value,
        ctx: &ToolContext,
    ) -> ToolCallOutcome {
        match self.try_call(tool_id, params, ctx).await {
            Ok((result, mutates_store)) => {
                if mutates_store && result.success {
                    info!(
                        tool_id,
                        session_id = %ctx.session_id,
                        correlation_id = %ctx.correlation_id,
                        "Store updated"
                    );
                } else {
                    debug!(
                        tool_id,
                        session_id = %ctx.session_id,
                        success = result.success,
                        "Tool call finished"
                    );
                }
                ToolCallOutcome::from_result(tool_id, result)
            }
            Err(e) => {
                warn!(
                    tool_id,
                    session_id = %ctx.session_id,
                    correlation_id = %ctx.correlation_id,
                    caller = ctx.caller.as_deref().unwrap_or("-"),
                    "Tool call failed: {}",
                    e
                );
                ToolCallOutcome::failure(tool_id, e)
            }
        }
    }

    async fn try_call(
        &self,
        tool_id: &str,
        params: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<(ToolResult, bool), ToolError> {
        let tool = self
            .registry
            .get(tool_id)
            .ok_or_else(|| ToolError::NotFound(tool_id.to_string()))?;
        let mutates_store = tool.definition().mutates_store;
        if self.read_only && mutates_store {
            return Err(ToolError::ReadOnly(tool_id.to_string()));
        }
        tool.validate(&params)?;

        let run = tool.execute(params, ctx.clone());
        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, run)
                .await
                .map_err(|_| ToolError::Timeout(limit.as_secs()))??,
            None => run.await?,
        };
        Ok((result, mutates_store))
    }
}

#[async_trait]
impl ToolInvoker for ToolBridge {
    async fn invoke(
        &self,
        tool_id: &str,
        params: serde_json::Value,
        ctx: &ToolContext,
    ) -> ToolCallOutcome {
        self.call(tool_id, params, ctx).await
    }

    fn available_tools(&self) -> Vec<ToolDefinition> {
        self.registry.list()
    }
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
