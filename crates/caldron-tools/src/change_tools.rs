//! Tools over the pending change queue.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use caldron_config::ApplyPolicy;
use caldron_protocols::error::ToolError;
use caldron_protocols::tool::{Tool, ToolContext, ToolDefinition, ToolResult, empty_object_schema};
use caldron_stores::{DocumentEdit, Ingredient, PendingChange, PendingChangeQueue};

use crate::common::{IngredientSpec, ingredient_schema, parse_params, store_failure};
use crate::error::RegistryError;
use crate::registry::ToolRegistry;
use crate::sessions::SessionStores;

pub(crate) fn register(
    registry: &ToolRegistry,
    sessions: &Arc<SessionStores>,
    policy: ApplyPolicy,
) -> Result<(), RegistryError> {
    registry.register(Arc::new(SuggestChangeTool::new(sessions.clone())))?;
    registry.register(Arc::new(ListChangesTool::new(sessions.clone())))?;
    registry.register(Arc::new(ApplyChangeTool::new(sessions.clone(), policy)))?;
    registry.register(Arc::new(ReprioritizeChangeTool::new(sessions.clone())))?;
    registry.register(Arc::new(RemoveChangeTool::new(sessions.clone())))?;
    Ok(())
}

fn change_json(change: &PendingChange) -> serde_json::Value {
    serde_json::to_value(change).unwrap_or(serde_json::Value::Null)
}

fn describe(change: &PendingChange) -> String {
    match &change.edit {
        Some(edit) => format!("[{}] priority {}: {}", change.id, change.priority, edit),
        None => format!("[{}] priority {}: (empty)", change.id, change.priority),
    }
}

// ---------------------------------------------------------------------------
// suggest_change
// ---------------------------------------------------------------------------

/// An ingredient named either bare or as `{"name": ...}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IngredientRef {
    Bare(String),
    Named { name: String },
}

impl IngredientRef {
    fn into_name(self) -> String {
        match self {
            IngredientRef::Bare(name) | IngredientRef::Named { name } => name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct IngredientUpdate {
    name: String,
    #[serde(default)]
    quantity: Option<f64>,
    #[serde(default)]
    unit: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SuggestChangeParams {
    priority: i64,
    #[serde(default)]
    add_ingredient: Option<IngredientSpec>,
    #[serde(default)]
    remove_ingredient: Option<IngredientRef>,
    #[serde(default)]
    update_ingredient: Option<IngredientUpdate>,
    #[serde(default, alias = "add_instruction")]
    add_step: Option<String>,
    #[serde(default, alias = "remove_instruction")]
    remove_step: Option<String>,
    #[serde(default)]
    add_tag: Option<String>,
    #[serde(default)]
    remove_tag: Option<String>,
}

impl SuggestChangeParams {
    /// At most one edit per change.
    fn into_change(self) -> Result<PendingChange, ToolError> {
        let mut edits = Vec::new();
        if let Some(spec) = self.add_ingredient {
            edits.push(DocumentEdit::AddIngredient {
                ingredient: Ingredient::from(spec),
            });
        }
        if let Some(target) = self.remove_ingredient {
            edits.push(DocumentEdit::RemoveIngredient {
                name: target.into_name(),
            });
        }
        if let Some(update) = self.update_ingredient {
            edits.push(DocumentEdit::UpdateIngredient {
                name: update.name,
                quantity: update.quantity,
                unit: update.unit,
            });
        }
        if let Some(step) = self.add_step {
            edits.push(DocumentEdit::AddStep { step });
        }
        if let Some(step) = self.remove_step {
            edits.push(DocumentEdit::RemoveStep { step });
        }
        if let Some(tag) = self.add_tag {
            edits.push(DocumentEdit::AddTag { tag });
        }
        if let Some(tag) = self.remove_tag {
            edits.push(DocumentEdit::RemoveTag { tag });
        }

        if edits.len() > 1 {
            return Err(ToolError::InvalidParameters(format!(
                "A change carries at most one edit, got {}",
                edits.len()
            )));
        }
        Ok(PendingChange::new(self.priority, edits.pop()))
    }
}

/// Queue an edit to the current document.
pub struct SuggestChangeTool {
    definition: ToolDefinition,
    sessions: Arc<SessionStores>,
}

impl SuggestChangeTool {
    pub fn new(sessions: Arc<SessionStores>) -> Self {
        let schema = serde_json::json!({
            "type": "object",
            "properties": {
                "priority": {
                    "type": "integer",
                    "description": "Lower values are applied first"
                },
                "add_ingredient": ingredient_schema(),
                "remove_ingredient": {
                    "type": "object",
                    "properties": {"name": {"type": "string"}},
                    "required": ["name"]
                },
                "update_ingredient": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string"},
                        "quantity": {"type": "number"},
                        "unit": {"type": "string"}
                    },
                    "required": ["name"]
                },
                "add_step": {"type": "string"},
                "remove_step": {"type": "string"},
                "add_tag": {"type": "string"},
                "remove_tag": {"type": "string"}
            },
            "required": ["priority"]
        });
        Self {
            definition: ToolDefinition::new(
                "suggest_change",
                "Suggest Change",
                "Suggest one edit to the current document. Lower priority values are applied first.",
            )
            .with_parameters_schema(schema)
            .mutating(),
            sessions,
        }
    }
}

#[async_trait]
impl Tool for SuggestChangeTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let params: SuggestChangeParams = parse_params(params)?;
        let change = params.into_change()?;
        let summary = describe(&change);
        let stores = self.sessions.for_session(&ctx.session_id);
        let id = stores
            .mutate(|q: &mut PendingChangeQueue| q.suggest(change))
            .await
            .map_err(store_failure)?;
        debug!("Suggested change {}", id);
        Ok(ToolResult::success_json(
            format!("Change suggested: {}", summary),
            serde_json::json!({ "id": id }),
        ))
    }
}

// ---------------------------------------------------------------------------
// list_changes
// ---------------------------------------------------------------------------

/// Pending changes, most urgent first.
pub struct ListChangesTool {
    definition: ToolDefinition,
    sessions: Arc<SessionStores>,
}

impl ListChangesTool {
    pub fn new(sessions: Arc<SessionStores>) -> Self {
        Self {
            definition: ToolDefinition::new(
                "list_changes",
                "List Changes",
                "List pending changes in the order they would be applied.",
            )
            .with_parameters_schema(empty_object_schema()),
            sessions,
        }
    }
}

#[async_trait]
impl Tool for ListChangesTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        _params: serde_json::Value,
        ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let stores = self.sessions.for_session(&ctx.session_id);
        let changes = stores
            .read(|q: &PendingChangeQueue| q.list())
            .await
            .map_err(store_failure)?;

        if changes.is_empty() {
            return Ok(ToolResult::success_json(
                "No pending changes.",
                serde_json::json!([]),
            ));
        }
        let lines: Vec<String> = changes.iter().map(describe).collect();
        Ok(ToolResult::success_json(
            lines.join("\n"),
            serde_json::Value::Array(changes.iter().map(change_json).collect()),
        ))
    }
}

// ---------------------------------------------------------------------------
// apply_change
// ---------------------------------------------------------------------------

/// Merge the most urgent change into the current document.
pub struct ApplyChangeTool {
    definition: ToolDefinition,
    sessions: Arc<SessionStores>,
    policy: ApplyPolicy,
}

impl ApplyChangeTool {
    pub fn new(sessions: Arc<SessionStores>, policy: ApplyPolicy) -> Self {
        Self {
            definition: ToolDefinition::new(
                "apply_change",
                "Apply Change",
                "Apply the most urgent pending change to the current document.",
            )
            .with_parameters_schema(empty_object_schema())
            .mutating(),
            sessions,
            policy,
        }
    }
}

#[async_trait]
impl Tool for ApplyChangeTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        _params: serde_json::Value,
        ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let policy = self.policy;
        let stores = self.sessions.for_session(&ctx.session_id);
        let (change, success) = stores
            .mutate_graph_and_changes(move |graph, queue| queue.apply(graph, policy))
            .await
            .map_err(store_failure)?;

        let Some(change) = change else {
            return Ok(ToolResult::success_json(
                "No change was applied.",
                serde_json::json!({ "change": null, "success": false }),
            ));
        };
        let content = if success {
            format!("Applied {}", describe(&change))
        } else {
            format!("Could not apply {}; change discarded", describe(&change))
        };
        Ok(ToolResult::success_json(
            content,
            serde_json::json!({ "change": change_json(&change), "success": success }),
        ))
    }
}

// ---------------------------------------------------------------------------
// reprioritize_change / remove_change
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ReprioritizeParams {
    id: Uuid,
    priority: i64,
}

#[derive(Debug, Deserialize)]
struct RemoveParams {
    id: Uuid,
}

/// Give a queued change a new priority.
pub struct ReprioritizeChangeTool {
    definition: ToolDefinition,
    sessions: Arc<SessionStores>,
}

impl ReprioritizeChangeTool {
    pub fn new(sessions: Arc<SessionStores>) -> Self {
        let schema = serde_json::json!({
            "type": "object",
            "properties": {
                "id": {"type": "string"},
                "priority": {"type": "integer"}
            },
            "required": ["id", "priority"]
        });
        Self {
            definition: ToolDefinition::new(
                "reprioritize_change",
                "Reprioritize Change",
                "Change the priority of a pending change.",
            )
            .with_parameters_schema(schema)
            .mutating(),
            sessions,
        }
    }
}

#[async_trait]
impl Tool for ReprioritizeChangeTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let params: ReprioritizeParams = parse_params(params)?;
        let stores = self.sessions.for_session(&ctx.session_id);
        let found = stores
            .mutate(|q: &mut PendingChangeQueue| q.reprioritize(params.id, params.priority))
            .await
            .map_err(store_failure)?;
        if !found {
            return Err(ToolError::ExecutionFailed(format!(
                "No pending change {}",
                params.id
            )));
        }
        Ok(ToolResult::success(format!(
            "Change {} now has priority {}",
            params.id, params.priority
        )))
    }
}

/// Drop a queued change.
pub struct RemoveChangeTool {
    definition: ToolDefinition,
    sessions: Arc<SessionStores>,
}

impl RemoveChangeTool {
    pub fn new(sessions: Arc<SessionStores>) -> Self {
        let schema = serde_json::json!({
            "type": "object",
            "properties": {"id": {"type": "string"}},
            "required": ["id"]
        });
        Self {
            definition: ToolDefinition::new(
                "remove_change",
                "Remove Change",
                "Remove a pending change without applying it.",
            )
            .with_parameters_schema(schema)
            .mutating(),
            sessions,
        }
    }
}

#[async_trait]
impl Tool for RemoveChangeTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let params: RemoveParams = parse_params(params)?;
        let stores = self.sessions.for_session(&ctx.session_id);
        let removed = stores
            .mutate(|q: &mut PendingChangeQueue| q.remove(params.id))
            .await
            .map_err(store_failure)?;
        if !removed {
            return Err(ToolError::ExecutionFailed(format!(
                "No pending change {}",
                params.id
            )));
        }
        Ok(ToolResult::success(format!("Change {} removed", params.id)))
    }
}

#[cfg(test)]
#[path = "change_tools_tests.rs"]
mod tests;
