//! Tool trait definition.

use async_trait::async_trait;

use super::{ToolContext, ToolDefinition, ToolResult};
use crate::error::ToolError;

/// Core trait for tools.
///
/// A tool is a named operation with a fixed JSON input schema. Store tools
/// and external collaborators (search, scrape) implement the same trait.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool definition.
    fn definition(&self) -> &ToolDefinition;

    /// Execute the tool with the given parameters.
    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: ToolContext,
    ) -> Result<ToolResult, ToolError>;

    /// Validate the parameters before execution.
    ///
    /// Checks the object shape and that every `required` key is present.
    fn validate(&self, params: &serde_json::Value) -> Result<(), ToolError> {
        let definition = self.definition();
        let Some(schema) = &definition.parameters_schema else {
            return Ok(());
        };
        if schema.get("type") == Some(&serde_json::json!("object")) {
            let Some(obj) = params.as_object() else {
                return Err(ToolError::ValidationFailed(
                    "Parameters must be an object".to_string(),
                ));
            };
            for key in definition.required_parameters() {
                if !obj.contains_key(key) {
                    return Err(ToolError::ValidationFailed(format!(
                        "Missing required parameter '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockTool {
        definition: ToolDefinition,
    }

    impl MockTool {
        fn new() -> Self {
            Self {
                definition: ToolDefinition::new("mock_tool", "Mock Tool", "A mock tool for testing"),
            }
        }

        fn with_schema(schema: serde_json::Value) -> Self {
            Self {
                definition: ToolDefinition::new("mock_tool", "Mock Tool", "A mock tool")
                    .with_parameters_schema(schema),
            }
        }
    }

    #[async_trait]
    impl Tool for MockTool {
        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn execute(
            &self,
            _params: serde_json::Value,
            _ctx: ToolContext,
        ) -> Result<ToolResult, ToolError> {
            Ok(ToolResult::success("executed"))
        }
    }

    #[test]
    fn test_tool_validate_no_schema() {
        let tool = MockTool::new();
        assert!(tool.validate(&serde_json::json!("anything")).is_ok());
    }

    #[test]
    fn test_tool_validate_non_object() {
        let tool = MockTool::with_schema(serde_json::json!({"type": "object"}));
        for params in [
            serde_json::json!("text"),
            serde_json::json!([1, 2]),
            serde_json::json!(42),
            serde_json::Value::Null,
        ] {
            match tool.validate(&params) {
                Err(ToolError::ValidationFailed(msg)) => assert!(msg.contains("must be an object")),
                other => panic!("Expected ValidationFailed, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_tool_validate_missing_required() {
        let tool = MockTool::with_schema(serde_json::json!({
            "type": "object",
            "properties": {"id": {"type": "string"}},
            "required": ["id"]
        }));
        let err = tool.validate(&serde_json::json!({})).unwrap_err();
        assert!(err.to_string().contains("'id'"));
        assert!(tool.validate(&serde_json::json!({"id": "x"})).is_ok());
    }

    #[test]
    fn test_tool_validate_non_object_schema() {
        let tool = MockTool::with_schema(serde_json::json!({"type": "string"}));
        assert!(tool.validate(&serde_json::json!("a string")).is_ok());
    }

    #[tokio::test]
    async fn test_tool_execute() {
        let tool = MockTool::new();
        let result = tool
            .execute(serde_json::json!({}), ToolContext::new("session-1"))
            .await
            .unwrap();
        assert_eq!(result.content, "executed");
    }
}
