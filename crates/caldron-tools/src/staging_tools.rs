//! Tools over the staging area.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use caldron_protocols::error::ToolError;
use caldron_protocols::tool::{Tool, ToolContext, ToolDefinition, ToolResult, empty_object_schema};
use caldron_stores::{ResultGraph, StagingArea};

use crate::common::{DocumentDraft, document_json, document_schema, parse_params, store_failure};
use crate::error::RegistryError;
use crate::registry::ToolRegistry;
use crate::sessions::SessionStores;

pub(crate) fn register(
    registry: &ToolRegistry,
    sessions: &Arc<SessionStores>,
) -> Result<(), RegistryError> {
    registry.register(Arc::new(AddReferenceTool::new(sessions.clone())))?;
    registry.register(Arc::new(PopReferenceTool::new(sessions.clone())))?;
    registry.register(Arc::new(BuildDocumentTool::new(sessions.clone())))?;
    registry.register(Arc::new(GetStagedDocumentTool::new(sessions.clone())))?;
    registry.register(Arc::new(ExamineStagingTool::new(sessions.clone())))?;
    registry.register(Arc::new(ClearStagingTool::new(sessions.clone())))?;
    registry.register(Arc::new(MoveDocumentToGraphTool::new(sessions.clone())))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// add_reference
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct AddReferenceParams {
    #[serde(alias = "url")]
    reference: String,
}

/// Stage a raw reference (usually a URL) for later research.
pub struct AddReferenceTool {
    definition: ToolDefinition,
    sessions: Arc<SessionStores>,
}

impl AddReferenceTool {
    pub fn new(sessions: Arc<SessionStores>) -> Self {
        let schema = serde_json::json!({
            "type": "object",
            "properties": {
                "reference": {"type": "string", "description": "URL or other source reference"}
            },
            "required": ["reference"]
        });
        Self {
            definition: ToolDefinition::new(
                "add_reference",
                "Add Reference",
                "Add a reference (e.g. a URL) to the staging area.",
            )
            .with_parameters_schema(schema)
            .mutating(),
            sessions,
        }
    }
}

#[async_trait]
impl Tool for AddReferenceTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let params: AddReferenceParams = parse_params(params)?;
        if params.reference.trim().is_empty() {
            return Err(ToolError::InvalidParameters("reference is empty".to_string()));
        }
        let stores = self.sessions.for_session(&ctx.session_id);
        let count = stores
            .mutate(|s: &mut StagingArea| {
                s.add_reference(params.reference);
                s.references_len()
            })
            .await
            .map_err(store_failure)?;
        Ok(ToolResult::success(format!(
            "Reference added to staging area ({} staged).",
            count
        )))
    }
}

// ---------------------------------------------------------------------------
// pop_reference
// ---------------------------------------------------------------------------

/// Take the oldest staged reference.
pub struct PopReferenceTool {
    definition: ToolDefinition,
    sessions: Arc<SessionStores>,
}

impl PopReferenceTool {
    pub fn new(sessions: Arc<SessionStores>) -> Self {
        Self {
            definition: ToolDefinition::new(
                "pop_reference",
                "Pop Reference",
                "Remove and return the oldest reference in the staging area.",
            )
            .with_parameters_schema(empty_object_schema())
            .mutating(),
            sessions,
        }
    }
}

#[async_trait]
impl Tool for PopReferenceTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        _params: serde_json::Value,
        ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let stores = self.sessions.for_session(&ctx.session_id);
        let popped = stores
            .mutate(|s: &mut StagingArea| s.pop_reference())
            .await
            .map_err(store_failure)?;
        Ok(match popped {
            Some(reference) => ToolResult::success_json(
                reference.clone(),
                serde_json::json!({ "reference": reference }),
            ),
            None => ToolResult::success_json(
                "No references in staging area.",
                serde_json::json!({ "reference": null }),
            ),
        })
    }
}

// ---------------------------------------------------------------------------
// build_document
// ---------------------------------------------------------------------------

/// Build a draft document and stage it.
pub struct BuildDocumentTool {
    definition: ToolDefinition,
    sessions: Arc<SessionStores>,
}

impl BuildDocumentTool {
    pub fn new(sessions: Arc<SessionStores>) -> Self {
        Self {
            definition: ToolDefinition::new(
                "build_document",
                "Build Document",
                "Build a draft document from name, ingredients and steps, and add it to the staging area.",
            )
            .with_parameters_schema(document_schema())
            .mutating(),
            sessions,
        }
    }
}

#[async_trait]
impl Tool for BuildDocumentTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let draft: DocumentDraft = parse_params(params)?;
        let doc = draft.into_document()?;
        let id = doc.id();
        let tiny = doc.tiny();
        debug!("build_document: {}", tiny);

        let stores = self.sessions.for_session(&ctx.session_id);
        stores
            .mutate(|s: &mut StagingArea| s.add_document(doc))
            .await
            .map_err(store_failure)?
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

        Ok(ToolResult::success_json(
            format!("Staged document {}", tiny),
            serde_json::json!({ "id": id }),
        ))
    }
}

// ---------------------------------------------------------------------------
// get_staged_document
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GetStagedParams {
    #[serde(default)]
    id: Option<Uuid>,
}

/// Look up a staged draft by id, or take the oldest one.
pub struct GetStagedDocumentTool {
    definition: ToolDefinition,
    sessions: Arc<SessionStores>,
}

impl GetStagedDocumentTool {
    pub fn new(sessions: Arc<SessionStores>) -> Self {
        let schema = serde_json::json!({
            "type": "object",
            "properties": {
                "id": {
                    "type": "string",
                    "description": "Staged document id. When omitted, the oldest draft is removed and returned."
                }
            }
        });
        Self {
            definition: ToolDefinition::new(
                "get_staged_document",
                "Get Staged Document",
                "Get a draft document from the staging area.",
            )
            .with_parameters_schema(schema)
            .mutating(),
            sessions,
        }
    }
}

#[async_trait]
impl Tool for GetStagedDocumentTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let params: GetStagedParams = parse_params(params)?;
        let stores = self.sessions.for_session(&ctx.session_id);
        let found = match params.id {
            Some(id) => stores
                .read(|s: &StagingArea| s.get_document(id).cloned())
                .await
                .map_err(store_failure)?,
            None => stores
                .mutate(|s: &mut StagingArea| s.pop_document())
                .await
                .map_err(store_failure)?,
        };
        Ok(match found {
            Some(doc) => ToolResult::success_json(doc.tiny(), document_json(&doc)),
            None => ToolResult::success_json("No matching staged document.", serde_json::Value::Null),
        })
    }
}

// ---------------------------------------------------------------------------
// examine_staging
// ---------------------------------------------------------------------------

/// List everything in the staging area.
pub struct ExamineStagingTool {
    definition: ToolDefinition,
    sessions: Arc<SessionStores>,
}

impl ExamineStagingTool {
    pub fn new(sessions: Arc<SessionStores>) -> Self {
        Self {
            definition: ToolDefinition::new(
                "examine_staging",
                "Examine Staging",
                "List the draft documents and references in the staging area.",
            )
            .with_parameters_schema(empty_object_schema()),
            sessions,
        }
    }
}

#[async_trait]
impl Tool for ExamineStagingTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        _params: serde_json::Value,
        ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let stores = self.sessions.for_session(&ctx.session_id);
        let (documents, references) = stores
            .read(|s: &StagingArea| s.list_all())
            .await
            .map_err(store_failure)?;

        let mut output = format!(
            "{} document(s), {} reference(s)\n",
            documents.len(),
            references.len()
        );
        for doc in &documents {
            output.push_str(&format!("document: {}\n", doc.tiny()));
        }
        for reference in &references {
            output.push_str(&format!("reference: {}\n", reference));
        }

        let structured = serde_json::json!({
            "documents": documents.iter().map(|d| serde_json::json!({"id": d.id(), "name": d.name})).collect::<Vec<_>>(),
            "references": references,
        });
        Ok(ToolResult::success_json(output, structured))
    }
}

// ---------------------------------------------------------------------------
// clear_staging
// ---------------------------------------------------------------------------

/// Empty the staging area.
pub struct ClearStagingTool {
    definition: ToolDefinition,
    sessions: Arc<SessionStores>,
}

impl ClearStagingTool {
    pub fn new(sessions: Arc<SessionStores>) -> Self {
        Self {
            definition: ToolDefinition::new(
                "clear_staging",
                "Clear Staging",
                "Remove every draft document and reference from the staging area.",
            )
            .with_parameters_schema(empty_object_schema())
            .mutating(),
            sessions,
        }
    }
}

#[async_trait]
impl Tool for ClearStagingTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        _params: serde_json::Value,
        ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let stores = self.sessions.for_session(&ctx.session_id);
        stores
            .mutate(|s: &mut StagingArea| s.clear())
            .await
            .map_err(store_failure)?;
        Ok(ToolResult::success("Staging area cleared."))
    }
}

// ---------------------------------------------------------------------------
// move_document_to_graph
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct MoveParams {
    id: Uuid,
}

/// Move a staged draft into the result graph.
pub struct MoveDocumentToGraphTool {
    definition: ToolDefinition,
    sessions: Arc<SessionStores>,
}

impl MoveDocumentToGraphTool {
    pub fn new(sessions: Arc<SessionStores>) -> Self {
        let schema = serde_json::json!({
            "type": "object",
            "properties": {
                "id": {"type": "string", "description": "Staged document id"}
            },
            "required": ["id"]
        });
        Self {
            definition: ToolDefinition::new(
                "move_document_to_graph",
                "Move Document To Graph",
                "Move a staged document into the result graph. It becomes the root of an empty graph, or a new version of the current document.",
            )
            .with_parameters_schema(schema)
            .mutating(),
            sessions,
        }
    }
}

#[async_trait]
impl Tool for MoveDocumentToGraphTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let params: MoveParams = parse_params(params)?;
        let stores = self.sessions.for_session(&ctx.session_id);

        let (position, doc) = stores
            .mutate(|s: &mut StagingArea| s.take_document_at(params.id))
            .await
            .map_err(store_failure)?
            .ok_or_else(|| {
                ToolError::ExecutionFailed(format!("No staged document with id {}", params.id))
            })?;

        let inserted = stores
            .mutate({
                let doc = doc.clone();
                move |g: &mut ResultGraph| g.insert(doc)
            })
            .await;

        let failure = match inserted {
            Ok(Ok(node_id)) => {
                return Ok(ToolResult::success_json(
                    format!("Moved document to result graph as node {}", node_id),
                    serde_json::json!({ "id": node_id }),
                ));
            }
            Ok(Err(e)) => ToolError::ExecutionFailed(e.to_string()),
            Err(e) => store_failure(e),
        };

        // Put the draft back where it was so a failed move loses nothing.
        match stores
            .mutate(|s: &mut StagingArea| s.restore_document(position, doc))
            .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Could not restore staged document {}: {}", params.id, e),
            Err(e) => warn!("Could not restore staged document {}: {}", params.id, e),
        }
        Err(failure)
    }
}

#[cfg(test)]
#[path = "staging_tools_tests.rs"]
mod tests;
