//! Tool execution context.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Context for tool execution.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Session whose stores the tool operates on.
    pub session_id: String,

    /// Correlation ID for tracing a single call.
    pub correlation_id: String,

    /// Name of the worker making the call.
    pub caller: Option<String>,

    /// Additional context data.
    pub data: HashMap<String, serde_json::Value>,
}

impl ToolContext {
    /// Create a new tool context.
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            correlation_id: uuid::Uuid::new_v4().to_string(),
            caller: None,
            data: HashMap::new(),
        }
    }

    /// Record which worker is calling.
    pub fn with_caller(mut self, caller: impl Into<String>) -> Self {
        self.caller = Some(caller.into());
        self
    }

    /// Get a value from the context data.
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Set a value in the context data.
    pub fn set<T: Serialize>(&mut self, key: impl Into<String>, value: T) {
        if let Ok(v) = serde_json::to_value(value) {
            self.data.insert(key.into(), v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_context_new() {
        let ctx = ToolContext::new("session-1");
        assert_eq!(ctx.session_id, "session-1");
        assert!(!ctx.correlation_id.is_empty());
        assert!(ctx.caller.is_none());
        assert!(ctx.data.is_empty());
    }

    #[test]
    fn test_tool_context_with_caller() {
        let ctx = ToolContext::new("s").with_caller("researcher");
        assert_eq!(ctx.caller.as_deref(), Some("researcher"));
    }

    #[test]
    fn test_tool_context_get_set() {
        let mut ctx = ToolContext::new("session-1");
        ctx.set("count", 42i32);
        let result: Option<i32> = ctx.get("count");
        assert_eq!(result, Some(42));
        let missing: Option<String> = ctx.get("missing");
        assert!(missing.is_none());
    }

    #[test]
    fn test_tool_context_correlation_id_unique() {
        let ctx1 = ToolContext::new("session-1");
        let ctx2 = ToolContext::new("session-1");
        assert_ne!(ctx1.correlation_id, ctx2.correlation_id);
    }
}
