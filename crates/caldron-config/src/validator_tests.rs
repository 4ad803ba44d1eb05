use super::*;

#[test]
fn test_validate_default_config() {
    let result = ConfigValidator::validate(&Config::default());
    assert!(result.is_valid());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_validate_zero_budget() {
    let mut config = Config::default();
    config.orchestrator.step_budget = 0;

    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "orchestrator.step_budget"));
}

#[test]
fn test_validate_high_budget_warning() {
    let mut config = Config::default();
    config.orchestrator.step_budget = 5000;

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "orchestrator.step_budget"));
}

#[test]
fn test_validate_zero_timeout() {
    let mut config = Config::default();
    config.orchestrator.step_timeout_secs = Some(0);

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "orchestrator.step_timeout_secs"));
}

#[test]
fn test_validate_empty_store_name() {
    let mut config = Config::default();
    config.stores.graph_name = String::new();

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "stores.graph_name"));
}

#[test]
fn test_validate_store_name_with_separator() {
    let mut config = Config::default();
    config.stores.staging_name = "../escape".to_string();

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "stores.staging_name"));
}

#[test]
fn test_validate_duplicate_store_names() {
    let mut config = Config::default();
    config.stores.changes_name = config.stores.graph_name.clone();

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "stores"));
}

#[test]
fn test_validate_memory_backend_warning() {
    let mut config = Config::default();
    config.stores.backend = StoreBackend::Memory;

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "stores.backend"));
}

#[test]
fn test_validate_log_directive_accepted() {
    let mut config = Config::default();
    config.logging.level = "caldron_workflow=debug".to_string();
    assert!(ConfigValidator::validate(&config).warnings.is_empty());

    config.logging.level = "loud".to_string();
    assert!(!ConfigValidator::validate(&config).warnings.is_empty());
}

#[test]
fn test_validation_error_display() {
    let err = ValidationError::new("stores", "bad");
    assert_eq!(err.to_string(), "stores: bad");
}
