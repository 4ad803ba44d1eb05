//! Store and tool wiring for the Caldron binary.

use std::sync::Arc;

use tracing::info;

use caldron_config::Config;
use caldron_stores::{StoreNames, open_backend};
use caldron_tools::{SessionStores, ToolBridge, ToolRegistry, register_store_tools};

/// Everything a command needs to touch a session.
pub(crate) struct Engine {
    pub sessions: Arc<SessionStores>,
    pub bridge: Arc<ToolBridge>,
}

/// Open the configured backend and register the built-in tools.
pub(crate) async fn build_engine(config: &Config) -> anyhow::Result<Engine> {
    let backend = open_backend(&config.stores).await?;
    let sessions = Arc::new(SessionStores::new(
        backend,
        StoreNames::from(&config.stores),
    ));

    let registry = Arc::new(ToolRegistry::new());
    register_store_tools(&registry, sessions.clone(), config.orchestrator.apply_policy)?;
    info!("Registered {} tools", registry.len());

    Ok(Engine {
        sessions,
        bridge: Arc::new(ToolBridge::new(registry)),
    })
}
