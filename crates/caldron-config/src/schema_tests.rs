use super::*;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.logging.level, "info");
    assert!(config.logging.dir.is_none());
    assert!(!config.logging.json);
    assert_eq!(config.stores.backend, StoreBackend::File);
    assert_eq!(config.orchestrator.step_budget, 25);
    assert!(config.orchestrator.step_timeout_secs.is_none());
    assert_eq!(config.orchestrator.apply_policy, ApplyPolicy::Versioned);
}

#[test]
fn test_default_store_root() {
    let config = StoresConfig::default();
    assert!(config.root.ends_with(".caldron/stores"));
    assert_eq!(config.staging_name, "staging");
    assert_eq!(config.graph_name, "result_graph");
    assert_eq!(config.changes_name, "pending_changes");
}

#[test]
fn test_apply_policy_snake_case() {
    let config: OrchestratorConfig = toml::from_str("apply_policy = \"in_place\"").unwrap();
    assert_eq!(config.apply_policy, ApplyPolicy::InPlace);
    assert_eq!(config.step_budget, 25);
}

#[test]
fn test_store_backend_memory() {
    let config: StoresConfig = toml::from_str("backend = \"memory\"").unwrap();
    assert_eq!(config.backend, StoreBackend::Memory);
}

#[test]
fn test_unknown_backend_rejected() {
    let result: Result<StoresConfig, _> = toml::from_str("backend = \"sqlite\"");
    assert!(result.is_err());
}

#[test]
fn test_config_serialize_roundtrip_keeps_policy() {
    let mut config = Config::default();
    config.orchestrator.apply_policy = ApplyPolicy::InPlace;
    let text = toml::to_string(&config).unwrap();
    assert!(text.contains("in_place"));
}
