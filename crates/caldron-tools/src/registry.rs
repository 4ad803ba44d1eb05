//! Tool registry.

use dashmap::DashMap;
use std::sync::Arc;

use caldron_protocols::tool::{Tool, ToolDefinition};

use crate::error::RegistryError;

/// Registry of tools keyed by definition id.
pub struct ToolRegistry {
    tools: DashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: DashMap::new(),
        }
    }

    /// Register a tool. Fails if the id is taken.
    pub fn register(&self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let id = tool.definition().id.clone();
        match self.tools.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(entry) => {
                Err(RegistryError::AlreadyRegistered(entry.key().clone()))
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(tool);
                Ok(())
            }
        }
    }

    pub fn unregister(&self, id: &str) -> Result<(), RegistryError> {
        self.tools
            .remove(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(id).map(|t| t.clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tools.contains_key(id)
    }

    /// All tool definitions, sorted by id.
    pub fn list(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> =
            self.tools.iter().map(|t| t.definition().clone()).collect();
        defs.sort_by(|a, b| a.id.cmp(&b.id));
        defs
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use caldron_protocols::error::ToolError;
    use caldron_protocols::tool::{ToolContext, ToolResult};

    struct MockTool {
        definition: ToolDefinition,
    }

    impl MockTool {
        fn new(id: &str) -> Self {
            Self {
                definition: ToolDefinition::new(id, id, "mock"),
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
            Ok(ToolResult::success("ok"))
        }
    }

    #[test]
    fn test_register_and_get() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(MockTool::new("a"))).unwrap();
        assert!(registry.contains("a"));
        assert_eq!(registry.get("a").unwrap().definition().id, "a");
        assert!(registry.get("b").is_none());
    }

    #[test]
    fn test_register_duplicate() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(MockTool::new("a"))).unwrap();
        let err = registry.register(Arc::new(MockTool::new("a"))).unwrap_err();
        assert_eq!(err, RegistryError::AlreadyRegistered("a".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(MockTool::new("a"))).unwrap();
        registry.unregister("a").unwrap();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.unregister("a"),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_sorted() {
        let registry = ToolRegistry::new();
        for id in ["c", "a", "b"] {
            registry.register(Arc::new(MockTool::new(id))).unwrap();
        }
        let ids: Vec<String> = registry.list().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
