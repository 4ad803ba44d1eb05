//! Worker errors.

use thiserror::Error;

use super::ToolError;

#[derive(Debug, Error)]
pub enum WorkerError {
    /// The worker's external collaborator (e.g. a model call) failed.
    #[error("Worker execution failed: {0}")]
    ExecutionFailed(String),

    /// A router produced a label outside its declared route set.
    #[error("Router '{worker}' produced undeclared route '{label}'")]
    UnknownRoute { worker: String, label: String },

    #[error("Worker timed out after {0} seconds")]
    Timeout(u64),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_route_display() {
        let err = WorkerError::UnknownRoute {
            worker: "supervisor".to_string(),
            label: "Nowhere".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("supervisor"));
        assert!(display.contains("Nowhere"));
    }

    #[test]
    fn test_worker_error_from_tool_error() {
        let err: WorkerError = ToolError::NotFound("x".to_string()).into();
        assert!(matches!(err, WorkerError::Tool(ToolError::NotFound(_))));
    }

    #[test]
    fn test_worker_error_timeout() {
        let err = WorkerError::Timeout(5);
        assert!(err.to_string().contains("5 seconds"));
    }
}
