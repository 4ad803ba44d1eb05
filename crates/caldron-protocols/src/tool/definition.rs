//! Tool definition types.

use serde::{Deserialize, Serialize};

/// Definition of a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique identifier for the tool.
    pub id: String,

    /// Human-readable name.
    pub name: String,

    /// Description of what the tool does.
    pub description: String,

    /// JSON Schema for the parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters_schema: Option<serde_json::Value>,

    /// Whether the tool writes to a store.
    #[serde(default)]
    pub mutates_store: bool,
}

impl ToolDefinition {
    /// Create a new tool definition.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            parameters_schema: None,
            mutates_store: false,
        }
    }

    /// Set the parameters schema.
    pub fn with_parameters_schema(mut self, schema: serde_json::Value) -> Self {
        self.parameters_schema = Some(schema);
        self
    }

    /// Mark the tool as writing to a store.
    pub fn mutating(mut self) -> Self {
        self.mutates_store = true;
        self
    }

    /// Names listed under the schema's `required` key.
    pub fn required_parameters(&self) -> Vec<&str> {
        self.parameters_schema
            .as_ref()
            .and_then(|s| s.get("required"))
            .and_then(|r| r.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default()
    }
}

/// Schema for a tool without parameters.
pub fn empty_object_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {},
        "required": []
    })
}
