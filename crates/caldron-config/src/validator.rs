//! Configuration validation.

use crate::schema::{Config, StoreBackend};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();
        Self::validate_logging(config, &mut result);
        Self::validate_stores(config, &mut result);
        Self::validate_orchestrator(config, &mut result);
        result
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        let known = ["trace", "debug", "info", "warn", "error", "off"];
        let level = config.logging.level.to_ascii_lowercase();
        // Anything else is passed through as an EnvFilter directive.
        if !known.contains(&level.as_str()) && !level.contains('=') {
            result.add_warning(ValidationWarning::new(
                "logging.level",
                format!("Unrecognized log level '{}'", config.logging.level),
            ));
        }
    }

    fn validate_stores(config: &Config, result: &mut ValidationResult) {
        let names = [
            ("stores.staging_name", &config.stores.staging_name),
            ("stores.graph_name", &config.stores.graph_name),
            ("stores.changes_name", &config.stores.changes_name),
        ];
        for (path, name) in names {
            if name.is_empty() {
                result.add_error(ValidationError::new(path, "Store name cannot be empty"));
            } else if name.contains(['/', '\\']) || name.contains("..") {
                result.add_error(ValidationError::new(
                    path,
                    "Store name must not contain path separators",
                ));
            }
        }

        let s = &config.stores;
        if s.staging_name == s.graph_name
            || s.staging_name == s.changes_name
            || s.graph_name == s.changes_name
        {
            result.add_error(ValidationError::new(
                "stores",
                "Store names must be distinct",
            ));
        }

        if s.backend == StoreBackend::Memory {
            result.add_warning(ValidationWarning::new(
                "stores.backend",
                "Memory backend does not persist between runs",
            ));
        }
    }

    fn validate_orchestrator(config: &Config, result: &mut ValidationResult) {
        if config.orchestrator.step_budget == 0 {
            result.add_error(ValidationError::new(
                "orchestrator.step_budget",
                "step_budget must be greater than 0",
            ));
        }

        if config.orchestrator.step_budget > 1000 {
            result.add_warning(ValidationWarning::new(
                "orchestrator.step_budget",
                "step_budget is very high (>1000), a routing loop may run for a long time",
            ));
        }

        if config.orchestrator.step_timeout_secs == Some(0) {
            result.add_error(ValidationError::new(
                "orchestrator.step_timeout_secs",
                "step_timeout_secs must be greater than 0 when set",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
