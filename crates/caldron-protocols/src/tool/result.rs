//! Tool execution result types.

use serde::{Deserialize, Serialize};

/// Result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the execution was successful.
    pub success: bool,

    /// Output content.
    pub content: String,

    /// Structured output (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_output: Option<serde_json::Value>,

    /// Error message if execution failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    /// Create a successful result with text content.
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            success: true,
            content: content.into(),
            structured_output: None,
            error: None,
        }
    }

    /// Create a successful result with structured output.
    pub fn success_json(content: impl Into<String>, output: serde_json::Value) -> Self {
        Self {
            structured_output: Some(output),
            ..Self::success(content)
        }
    }

    /// Create an error result.
    pub fn error(error: impl Into<String>) -> Self {
        Self {
            success: false,
            content: String::new(),
            structured_output: None,
            error: Some(error.into()),
        }
    }
}

/// What a worker sees after calling a tool through a [`ToolInvoker`].
///
/// Tool faults never cross this boundary as errors: a failure arrives as
/// `success == false` with a human-readable `content`.
///
/// [`ToolInvoker`]: crate::worker::ToolInvoker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallOutcome {
    pub tool_id: String,
    pub success: bool,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured: Option<serde_json::Value>,
}

impl ToolCallOutcome {
    /// Outcome of a tool that ran; a tool-reported error becomes a failure string.
    pub fn from_result(tool_id: impl Into<String>, result: ToolResult) -> Self {
        let content = if result.success {
            result.content
        } else {
            format!(
                "Tool failed: {}",
                result.error.unwrap_or_else(|| "unknown error".to_string())
            )
        };
        Self {
            tool_id: tool_id.into(),
            success: result.success,
            content,
            structured: result.structured_output,
        }
    }

    /// Failure outcome carrying an error description.
    pub fn failure(tool_id: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self {
            tool_id: tool_id.into(),
            success: false,
            content: format!("Tool error: {}", error),
            structured: None,
        }
    }
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
