//! Store errors.

use thiserror::Error;
use uuid::Uuid;

/// Persistence errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The snapshot does not exist and the operation requires it.
    #[error("Store not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result graph errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("Result graph already has a root document")]
    AlreadyInitialized,

    #[error("Result graph is empty")]
    Empty,

    #[error("Document already in graph: {0}")]
    DuplicateDocument(Uuid),

    #[error("Document not found in graph: {0}")]
    NodeNotFound(Uuid),

    #[error("Invalid result graph snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Staging area errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StagingError {
    #[error("Document already staged: {0}")]
    DuplicateDocument(Uuid),
}

/// Document validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Invalid document: {0}")]
    Invalid(String),
}

/// Why an edit could not be merged into a document.
#[derive(Debug, Error, PartialEq)]
pub(crate) enum ApplyError {
    #[error("change carries no edit")]
    EmptyChange,

    #[error("no ingredient named '{0}'")]
    IngredientNotFound(String),

    #[error("no step '{0}'")]
    StepNotFound(String),

    #[error("tag '{0}' already present")]
    TagExists(String),

    #[error("no tag '{0}'")]
    TagNotFound(String),

    #[error("update for '{0}' sets neither quantity nor unit")]
    EmptyUpdate(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_not_found() {
        let err = StoreError::NotFound("s1.result_graph".to_string());
        assert!(err.to_string().contains("not found"));
        assert!(err.to_string().contains("s1.result_graph"));
    }

    #[test]
    fn test_store_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StoreError = io_err.into();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[test]
    fn test_graph_error_display() {
        let id = Uuid::new_v4();
        let err = GraphError::NodeNotFound(id);
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_apply_error_display() {
        let err = ApplyError::IngredientNotFound("salt".to_string());
        assert_eq!(err.to_string(), "no ingredient named 'salt'");
    }
}
