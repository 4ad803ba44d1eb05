//! Tools over the result graph.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use caldron_protocols::error::ToolError;
use caldron_protocols::tool::{Tool, ToolContext, ToolDefinition, ToolResult, empty_object_schema};
use caldron_stores::ResultGraph;

use crate::common::{DocumentDraft, document_json, document_schema, parse_params, store_failure};
use crate::error::RegistryError;
use crate::registry::ToolRegistry;
use crate::sessions::SessionStores;

pub(crate) fn register(
    registry: &ToolRegistry,
    sessions: &Arc<SessionStores>,
) -> Result<(), RegistryError> {
    registry.register(Arc::new(CreateResultGraphTool::new(sessions.clone())))?;
    registry.register(Arc::new(AddVersionTool::new(sessions.clone())))?;
    registry.register(Arc::new(GetDocumentTool::new(sessions.clone())))?;
    registry.register(Arc::new(GetCurrentDocumentTool::new(sessions.clone())))?;
    registry.register(Arc::new(SetCurrentDocumentTool::new(sessions.clone())))?;
    registry.register(Arc::new(DescribeGraphTool::new(sessions.clone())))?;
    registry.register(Arc::new(GraphSizeTool::new(sessions.clone())))?;
    registry.register(Arc::new(ValidateDocumentTool::new(sessions.clone())))?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct IdParams {
    id: Uuid,
}

#[derive(Debug, Deserialize)]
struct OptionalIdParams {
    #[serde(default)]
    id: Option<Uuid>,
}

fn id_schema(description: &str, required: bool) -> serde_json::Value {
    let required: Vec<&str> = if required { vec!["id"] } else { Vec::new() };
    serde_json::json!({
        "type": "object",
        "properties": {
            "id": {"type": "string", "description": description}
        },
        "required": required
    })
}

// ---------------------------------------------------------------------------
// create_result_graph
// ---------------------------------------------------------------------------

/// Start a result graph with a root document.
pub struct CreateResultGraphTool {
    definition: ToolDefinition,
    sessions: Arc<SessionStores>,
}

impl CreateResultGraphTool {
    pub fn new(sessions: Arc<SessionStores>) -> Self {
        Self {
            definition: ToolDefinition::new(
                "create_result_graph",
                "Create Result Graph",
                "Create the result graph with the given document as its root. Only valid while the graph is empty.",
            )
            .with_parameters_schema(document_schema())
            .mutating(),
            sessions,
        }
    }
}

#[async_trait]
impl Tool for CreateResultGraphTool {
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
        let stores = self.sessions.for_session(&ctx.session_id);
        let id = stores
            .mutate(|g: &mut ResultGraph| g.create_with(doc))
            .await
            .map_err(store_failure)?
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;
        Ok(ToolResult::success_json(
            format!("Result graph created with root node {}", id),
            serde_json::json!({ "id": id }),
        ))
    }
}

// ---------------------------------------------------------------------------
// add_version
// ---------------------------------------------------------------------------

/// Add a document derived from the current one.
pub struct AddVersionTool {
    definition: ToolDefinition,
    sessions: Arc<SessionStores>,
}

impl AddVersionTool {
    pub fn new(sessions: Arc<SessionStores>) -> Self {
        Self {
            definition: ToolDefinition::new(
                "add_version",
                "Add Version",
                "Add a document to the result graph, derived from the current document, and make it current.",
            )
            .with_parameters_schema(document_schema())
            .mutating(),
            sessions,
        }
    }
}

#[async_trait]
impl Tool for AddVersionTool {
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
        let stores = self.sessions.for_session(&ctx.session_id);
        let id = stores
            .mutate(|g: &mut ResultGraph| g.add_version(doc))
            .await
            .map_err(store_failure)?
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;
        Ok(ToolResult::success_json(
            format!("New version added with node {}", id),
            serde_json::json!({ "id": id }),
        ))
    }
}

// ---------------------------------------------------------------------------
// get_document
// ---------------------------------------------------------------------------

/// Fetch a document by node id, defaulting to the current one.
pub struct GetDocumentTool {
    definition: ToolDefinition,
    sessions: Arc<SessionStores>,
}

impl GetDocumentTool {
    pub fn new(sessions: Arc<SessionStores>) -> Self {
        Self {
            definition: ToolDefinition::new(
                "get_document",
                "Get Document",
                "Get the document at a node of the result graph. Without an id, returns the current document.",
            )
            .with_parameters_schema(id_schema("Node id", false)),
            sessions,
        }
    }
}

#[async_trait]
impl Tool for GetDocumentTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let params: OptionalIdParams = parse_params(params)?;
        let stores = self.sessions.for_session(&ctx.session_id);
        let doc = stores
            .read_existing(|g: &ResultGraph| g.get(params.id).cloned())
            .await
            .map_err(store_failure)?;
        Ok(match doc {
            Some(doc) => ToolResult::success_json(doc.render(), document_json(&doc)),
            None => ToolResult::success_json("No document found.", serde_json::Value::Null),
        })
    }
}

// ---------------------------------------------------------------------------
// get_current_document
// ---------------------------------------------------------------------------

/// Fetch the current document.
pub struct GetCurrentDocumentTool {
    definition: ToolDefinition,
    sessions: Arc<SessionStores>,
}

impl GetCurrentDocumentTool {
    pub fn new(sessions: Arc<SessionStores>) -> Self {
        Self {
            definition: ToolDefinition::new(
                "get_current_document",
                "Get Current Document",
                "Get the current document of the result graph.",
            )
            .with_parameters_schema(empty_object_schema()),
            sessions,
        }
    }
}

#[async_trait]
impl Tool for GetCurrentDocumentTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        _params: serde_json::Value,
        ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let stores = self.sessions.for_session(&ctx.session_id);
        let doc = stores
            .read(|g: &ResultGraph| g.current().cloned())
            .await
            .map_err(store_failure)?;
        Ok(match doc {
            Some(doc) => ToolResult::success_json(doc.render(), document_json(&doc)),
            None => ToolResult::success_json("Result graph is empty.", serde_json::Value::Null),
        })
    }
}

// ---------------------------------------------------------------------------
// set_current_document
// ---------------------------------------------------------------------------

/// Point "current" at another node.
pub struct SetCurrentDocumentTool {
    definition: ToolDefinition,
    sessions: Arc<SessionStores>,
}

impl SetCurrentDocumentTool {
    pub fn new(sessions: Arc<SessionStores>) -> Self {
        Self {
            definition: ToolDefinition::new(
                "set_current_document",
                "Set Current Document",
                "Make the node with the given id the current document.",
            )
            .with_parameters_schema(id_schema("Node id", true))
            .mutating(),
            sessions,
        }
    }
}

#[async_trait]
impl Tool for SetCurrentDocumentTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let params: IdParams = parse_params(params)?;
        let stores = self.sessions.for_session(&ctx.session_id);
        stores
            .mutate(|g: &mut ResultGraph| g.set_current(params.id))
            .await
            .map_err(store_failure)?
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;
        Ok(ToolResult::success(format!(
            "Current document set to node {}",
            params.id
        )))
    }
}

// ---------------------------------------------------------------------------
// describe_graph
// ---------------------------------------------------------------------------

/// Nodes and edges of the result graph.
pub struct DescribeGraphTool {
    definition: ToolDefinition,
    sessions: Arc<SessionStores>,
}

impl DescribeGraphTool {
    pub fn new(sessions: Arc<SessionStores>) -> Self {
        Self {
            definition: ToolDefinition::new(
                "describe_graph",
                "Describe Graph",
                "Describe the nodes and derivation edges of the result graph.",
            )
            .with_parameters_schema(empty_object_schema()),
            sessions,
        }
    }
}

#[async_trait]
impl Tool for DescribeGraphTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        _params: serde_json::Value,
        ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let stores = self.sessions.for_session(&ctx.session_id);
        let summary = stores
            .read(|g: &ResultGraph| g.summary())
            .await
            .map_err(store_failure)?;

        let mut output = format!("Result graph: {} node(s)\n", summary.nodes.len());
        for (id, name) in &summary.nodes {
            let marker = if Some(*id) == summary.current { " (current)" } else { "" };
            output.push_str(&format!("node {} {}{}\n", id, name, marker));
        }
        for (from, to) in &summary.edges {
            output.push_str(&format!("edge {} -> {}\n", from, to));
        }
        let structured = serde_json::to_value(&summary)
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;
        Ok(ToolResult::success_json(output, structured))
    }
}

// ---------------------------------------------------------------------------
// graph_size
// ---------------------------------------------------------------------------

/// Number of nodes in the result graph.
pub struct GraphSizeTool {
    definition: ToolDefinition,
    sessions: Arc<SessionStores>,
}

impl GraphSizeTool {
    pub fn new(sessions: Arc<SessionStores>) -> Self {
        Self {
            definition: ToolDefinition::new(
                "graph_size",
                "Graph Size",
                "Get the number of nodes in the result graph.",
            )
            .with_parameters_schema(empty_object_schema()),
            sessions,
        }
    }
}

#[async_trait]
impl Tool for GraphSizeTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        _params: serde_json::Value,
        ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let stores = self.sessions.for_session(&ctx.session_id);
        let size = stores
            .read(|g: &ResultGraph| g.size())
            .await
            .map_err(store_failure)?;
        Ok(ToolResult::success_json(
            format!("Number of nodes in result graph: {}", size),
            serde_json::json!(size),
        ))
    }
}

// ---------------------------------------------------------------------------
// validate_document
// ---------------------------------------------------------------------------

/// Render the current document for review.
pub struct ValidateDocumentTool {
    definition: ToolDefinition,
    sessions: Arc<SessionStores>,
}

impl ValidateDocumentTool {
    pub fn new(sessions: Arc<SessionStores>) -> Self {
        Self {
            definition: ToolDefinition::new(
                "validate_document",
                "Validate Document",
                "Print the current document in full for review, with any structural problems.",
            )
            .with_parameters_schema(empty_object_schema()),
            sessions,
        }
    }
}

#[async_trait]
impl Tool for ValidateDocumentTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        _params: serde_json::Value,
        ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let stores = self.sessions.for_session(&ctx.session_id);
        let doc = stores
            .read(|g: &ResultGraph| g.current().cloned())
            .await
            .map_err(store_failure)?;
        let Some(doc) = doc else {
            return Ok(ToolResult::success("No document to validate."));
        };
        let checked = doc.validate();
        let verdict = match &checked {
            Ok(()) => "Document is structurally valid.".to_string(),
            Err(e) => e.to_string(),
        };
        Ok(ToolResult::success_json(
            format!("{}\n{}", doc.render(), verdict),
            serde_json::json!({ "valid": checked.is_ok() }),
        ))
    }
}

#[cfg(test)]
#[path = "graph_tools_tests.rs"]
mod tests;
