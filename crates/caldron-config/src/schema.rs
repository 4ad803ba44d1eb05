//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub stores: StoresConfig,

    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily-rolling log files. Console only when unset.
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Write the file layer as JSON lines.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Which snapshot backend holds the stores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    File,
    Memory,
}

/// Store persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoresConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Root directory for the file backend.
    #[serde(default = "default_store_root")]
    pub root: PathBuf,

    #[serde(default = "default_staging_name")]
    pub staging_name: String,

    #[serde(default = "default_graph_name")]
    pub graph_name: String,

    #[serde(default = "default_changes_name")]
    pub changes_name: String,
}

impl Default for StoresConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            root: default_store_root(),
            staging_name: default_staging_name(),
            graph_name: default_graph_name(),
            changes_name: default_changes_name(),
        }
    }
}

fn default_store_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".caldron")
        .join("stores")
}

fn default_staging_name() -> String {
    "staging".to_string()
}

fn default_graph_name() -> String {
    "result_graph".to_string()
}

fn default_changes_name() -> String {
    "pending_changes".to_string()
}

/// How an applied change lands in the result graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyPolicy {
    /// The edited document gets a fresh id and is added as a new version.
    #[default]
    Versioned,
    /// The current node is replaced under the same id.
    InPlace,
}

/// Orchestrator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Maximum worker invocations per run.
    #[serde(default = "default_step_budget")]
    pub step_budget: u32,

    /// Per-step timeout. No timeout when unset.
    #[serde(default)]
    pub step_timeout_secs: Option<u64>,

    #[serde(default)]
    pub apply_policy: ApplyPolicy,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            step_budget: default_step_budget(),
            step_timeout_secs: None,
            apply_policy: ApplyPolicy::default(),
        }
    }
}

fn default_step_budget() -> u32 {
    25
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
