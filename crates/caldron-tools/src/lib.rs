//! # Caldron Tools
//!
//! The tool side of the engine: a [`ToolRegistry`], the [`ToolBridge`]
//! workers call through, and the built-in tools over the session stores.

pub mod bridge;
pub mod change_tools;
mod common;
pub mod error;
pub mod graph_tools;
pub mod registry;
pub mod sessions;
pub mod staging_tools;
pub mod util_tools;

use std::sync::Arc;

use caldron_config::ApplyPolicy;

pub use bridge::ToolBridge;
pub use common::{DocumentDraft, IngredientSpec};
pub use error::RegistryError;
pub use registry::ToolRegistry;
pub use sessions::SessionStores;

/// Register every built-in store tool plus `get_datetime`.
pub fn register_store_tools(
    registry: &ToolRegistry,
    sessions: Arc<SessionStores>,
    policy: ApplyPolicy,
) -> Result<(), RegistryError> {
    staging_tools::register(registry, &sessions)?;
    graph_tools::register(registry, &sessions)?;
    change_tools::register(registry, &sessions, policy)?;
    registry.register(Arc::new(util_tools::DateTimeTool::new()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use caldron_stores::MemorySnapshotStore;

    #[test]
    fn test_register_store_tools() {
        let registry = ToolRegistry::new();
        let sessions = Arc::new(SessionStores::with_default_names(Arc::new(
            MemorySnapshotStore::new(),
        )));
        register_store_tools(&registry, sessions, ApplyPolicy::Versioned).unwrap();

        for id in [
            "add_reference",
            "pop_reference",
            "build_document",
            "get_staged_document",
            "examine_staging",
            "clear_staging",
            "move_document_to_graph",
            "create_result_graph",
            "add_version",
            "get_document",
            "get_current_document",
            "set_current_document",
            "describe_graph",
            "graph_size",
            "validate_document",
            "suggest_change",
            "list_changes",
            "apply_change",
            "reprioritize_change",
            "remove_change",
            "get_datetime",
        ] {
            assert!(registry.contains(id), "missing tool {}", id);
        }
        assert_eq!(registry.len(), 21);
    }

    #[test]
    fn test_register_twice_fails() {
        let registry = ToolRegistry::new();
        let sessions = Arc::new(SessionStores::with_default_names(Arc::new(
            MemorySnapshotStore::new(),
        )));
        register_store_tools(&registry, sessions.clone(), ApplyPolicy::Versioned).unwrap();
        let err = register_store_tools(&registry, sessions, ApplyPolicy::Versioned).unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyRegistered(_)));
    }
}
