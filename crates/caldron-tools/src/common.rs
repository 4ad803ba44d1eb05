//! Parameter types and helpers shared by the store tools.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use caldron_protocols::error::ToolError;
use caldron_stores::{Ingredient, ResultDocument, StoreError};

/// Ingredient as supplied in tool parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientSpec {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

impl From<IngredientSpec> for Ingredient {
    fn from(spec: IngredientSpec) -> Self {
        Ingredient::new(spec.name, spec.quantity, spec.unit)
    }
}

/// Document body as supplied in tool parameters. A fresh id is assigned
/// when it becomes a [`ResultDocument`].
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentDraft {
    pub name: String,
    pub ingredients: Vec<IngredientSpec>,
    #[serde(alias = "instructions")]
    pub steps: Vec<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub sources: Option<Vec<String>>,
}

impl DocumentDraft {
    /// Build and validate the document.
    pub fn into_document(self) -> Result<ResultDocument, ToolError> {
        let doc = ResultDocument::new(
            self.name,
            self.ingredients.into_iter().map(Ingredient::from).collect(),
            self.steps,
        )
        .with_tags(self.tags.unwrap_or_default())
        .with_sources(self.sources.unwrap_or_default());
        doc.validate()
            .map_err(|e| ToolError::ValidationFailed(e.to_string()))?;
        Ok(doc)
    }
}

pub(crate) fn parse_params<T: DeserializeOwned>(params: serde_json::Value) -> Result<T, ToolError> {
    serde_json::from_value(params).map_err(|e| ToolError::InvalidParameters(e.to_string()))
}

pub(crate) fn store_failure(err: StoreError) -> ToolError {
    match err {
        StoreError::NotFound(name) => ToolError::ExecutionFailed(format!("Store not found: {}", name)),
        other => ToolError::Store(other.to_string()),
    }
}

pub(crate) fn ingredient_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "name": {"type": "string"},
            "quantity": {"type": "number"},
            "unit": {"type": "string"}
        },
        "required": ["name", "quantity", "unit"]
    })
}

/// Schema for a document body.
pub(crate) fn document_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "name": {"type": "string", "description": "Document name"},
            "ingredients": {
                "type": "array",
                "items": ingredient_schema(),
                "minItems": 1,
                "description": "Example: [{\"name\": \"flour\", \"quantity\": 2, \"unit\": \"cups\"}]"
            },
            "steps": {
                "type": "array",
                "items": {"type": "string"},
                "minItems": 1
            },
            "tags": {"type": "array", "items": {"type": "string"}},
            "sources": {
                "type": "array",
                "items": {"type": "string"},
                "description": "Web sources, book references or other inspirations"
            }
        },
        "required": ["name", "ingredients", "steps"]
    })
}

pub(crate) fn document_json(doc: &ResultDocument) -> serde_json::Value {
    serde_json::to_value(doc).unwrap_or(serde_json::Value::Null)
}
