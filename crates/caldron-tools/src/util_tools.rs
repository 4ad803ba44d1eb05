//! Miscellaneous tools.

use async_trait::async_trait;

use caldron_protocols::error::ToolError;
use caldron_protocols::tool::{Tool, ToolContext, ToolDefinition, ToolResult, empty_object_schema};

/// Current local date and time.
pub struct DateTimeTool {
    definition: ToolDefinition,
}

impl DateTimeTool {
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition::new(
                "get_datetime",
                "Get Date and Time",
                "Get the current local date and time.",
            )
            .with_parameters_schema(empty_object_schema()),
        }
    }
}

impl Default for DateTimeTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for DateTimeTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        _params: serde_json::Value,
        _ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let now = chrono::Local::now();
        Ok(ToolResult::success_json(
            now.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
            serde_json::json!({ "rfc3339": now.to_rfc3339() }),
        ))
    }
}
