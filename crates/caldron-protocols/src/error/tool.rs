//! Tool execution errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Parameter validation failed: {0}")]
    ValidationFailed(String),

    /// A durable load or save failed while the tool was running.
    #[error("Store error: {0}")]
    Store(String),

    #[error("Tool execution timed out after {0} seconds")]
    Timeout(u64),

    /// A store-writing tool was called through a read-only bridge.
    #[error("Tool '{0}' writes to a store and this bridge is read-only")]
    ReadOnly(String),
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        ToolError::InvalidParameters(err.to_string())
    }
}
