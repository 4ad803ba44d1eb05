//! Deterministic workers and the TOML workflow scripts that wire them up.
//!
//! Reasoning over the conversation is external to the engine. These
//! workers stand in for it: a task worker replays a fixed list of tool
//! calls and a router replays a fixed list of routes.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use caldron_protocols::{
    ConversationState, Destination, RouteSet, RouterWorker, TaskWorker, WorkerContext, WorkerError,
    parse_route,
};

use crate::error::ScriptError;
use crate::graph::{CompiledWorkflow, WorkflowGraph};

fn empty_params() -> serde_json::Value {
    serde_json::json!({})
}

/// One tool call made by a [`ScriptedTaskWorker`].
///
/// A string parameter of the form `{{tool_id.field}}` is replaced by that
/// field of the structured output of the most recent earlier call to
/// `tool_id` in the same invocation. Numeric segments index arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedCall {
    pub tool: String,
    #[serde(default = "empty_params")]
    pub params: serde_json::Value,
}

impl ScriptedCall {
    pub fn new(tool: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            tool: tool.into(),
            params,
        }
    }
}

fn resolve(value: &serde_json::Value, outputs: &HashMap<String, serde_json::Value>) -> serde_json::Value {
    use serde_json::Value;
    match value {
        Value::String(s) => placeholder(s, outputs).unwrap_or_else(|| value.clone()),
        Value::Array(items) => Value::Array(items.iter().map(|v| resolve(v, outputs)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), resolve(v, outputs)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn placeholder(
    text: &str,
    outputs: &HashMap<String, serde_json::Value>,
) -> Option<serde_json::Value> {
    let path = text.trim().strip_prefix("{{")?.strip_suffix("}}")?.trim();
    let mut parts = path.split('.');
    let mut current = outputs.get(parts.next()?)?;
    for part in parts {
        current = match part.parse::<usize>() {
            Ok(index) if current.is_array() => current.get(index)?,
            _ => current.get(part)?,
        };
    }
    Some(current.clone())
}

/// Task worker that replays a fixed list of tool calls.
pub struct ScriptedTaskWorker {
    name: String,
    description: String,
    calls: Vec<ScriptedCall>,
    reply: Option<String>,
}

impl ScriptedTaskWorker {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            calls: Vec::new(),
            reply: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_call(mut self, tool: impl Into<String>, params: serde_json::Value) -> Self {
        self.calls.push(ScriptedCall::new(tool, params));
        self
    }

    pub fn with_calls(mut self, calls: impl IntoIterator<Item = ScriptedCall>) -> Self {
        self.calls.extend(calls);
        self
    }

    /// Reply with fixed text instead of the call summary.
    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = Some(reply.into());
        self
    }
}

#[async_trait]
impl TaskWorker for ScriptedTaskWorker {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn invoke(
        &self,
        _state: &ConversationState,
        ctx: &WorkerContext,
    ) -> Result<String, WorkerError> {
        let mut outputs: HashMap<String, serde_json::Value> = HashMap::new();
        let mut lines = Vec::with_capacity(self.calls.len());

        for call in &self.calls {
            let params = resolve(&call.params, &outputs);
            let outcome = ctx.call_tool(&self.name, &call.tool, params).await;
            let status = if outcome.success { "ok" } else { "failed" };
            lines.push(format!("{} [{}]: {}", call.tool, status, outcome.content));
            if let Some(structured) = outcome.structured {
                outputs.insert(call.tool.clone(), structured);
            }
        }
        debug!("'{}' made {} tool call(s)", self.name, self.calls.len());

        Ok(match &self.reply {
            Some(reply) => reply.clone(),
            None if lines.is_empty() => "No tool calls made.".to_string(),
            None => lines.join("\n"),
        })
    }
}

/// A route label declared at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StringRoute(String);

impl StringRoute {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }
}

impl RouteSet for StringRoute {
    fn label(&self) -> &str {
        &self.0
    }

    /// Declared per router; see [`ScriptedRouter`].
    fn all() -> Vec<Self> {
        Vec::new()
    }
}

/// Router that replays a fixed sequence of route labels.
///
/// The position in the sequence is shared by every run using this router.
pub struct ScriptedRouter {
    name: String,
    routes: Vec<StringRoute>,
    sequence: Vec<String>,
    repeat_last: bool,
    cursor: AtomicUsize,
}

impl ScriptedRouter {
    pub fn new<R, S>(name: impl Into<String>, routes: R, sequence: S) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self {
            name: name.into(),
            routes: routes.into_iter().map(StringRoute::new).collect(),
            sequence: sequence.into_iter().map(Into::into).collect(),
            repeat_last: false,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Keep producing the last label once the sequence is used up.
    pub fn repeat_last(mut self) -> Self {
        self.repeat_last = true;
        self
    }

    /// Start the sequence over.
    pub fn reset(&self) {
        self.cursor.store(0, Ordering::Relaxed);
    }
}

#[async_trait]
impl RouterWorker for ScriptedRouter {
    type Route = StringRoute;

    fn name(&self) -> &str {
        &self.name
    }

    fn routes(&self) -> Vec<StringRoute> {
        self.routes.clone()
    }

    async fn decide(
        &self,
        _state: &ConversationState,
        _ctx: &WorkerContext,
    ) -> Result<StringRoute, WorkerError> {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed);
        let label = match self.sequence.get(index) {
            Some(label) => label,
            None if self.repeat_last => self.sequence.last().ok_or_else(|| {
                WorkerError::ExecutionFailed(format!("Router '{}' has no scripted routes", self.name))
            })?,
            None => {
                return Err(WorkerError::ExecutionFailed(format!(
                    "Router '{}' ran out of scripted routes after {} decision(s)",
                    self.name,
                    self.sequence.len()
                )));
            }
        };
        parse_route(&self.name, label, &self.routes)
    }
}

/// One worker in a [`WorkflowScript`].
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkerSpec {
    Task {
        name: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        calls: Vec<ScriptedCall>,
        #[serde(default)]
        reply: Option<String>,
        /// Unconditional destination; `__end__` finishes the run.
        #[serde(default)]
        next: Option<String>,
    },
    Router {
        name: String,
        routes: Vec<String>,
        sequence: Vec<String>,
        #[serde(default)]
        repeat_last: bool,
        /// Route label to destination.
        #[serde(default)]
        map: Option<BTreeMap<String, String>>,
    },
}

impl WorkerSpec {
    pub fn name(&self) -> &str {
        match self {
            WorkerSpec::Task { name, .. } | WorkerSpec::Router { name, .. } => name,
        }
    }
}

/// A workflow described in TOML.
///
/// ```toml
/// entry = "supervisor"
///
/// [[workers]]
/// kind = "router"
/// name = "supervisor"
/// routes = ["researcher", "__end__"]
/// sequence = ["researcher", "__end__"]
/// map = { researcher = "researcher", __end__ = "__end__" }
///
/// [[workers]]
/// kind = "task"
/// name = "researcher"
/// next = "supervisor"
/// calls = [{ tool = "add_reference", params = { reference = "https://example.com" } }]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowScript {
    pub entry: String,
    #[serde(default)]
    pub workers: Vec<WorkerSpec>,
}

impl WorkflowScript {
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        if !path.exists() {
            return Err(ScriptError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ScriptError> {
        let script: Self = toml::from_str(content)?;
        script.check()?;
        Ok(script)
    }

    fn check(&self) -> Result<(), ScriptError> {
        for spec in &self.workers {
            if let WorkerSpec::Router {
                name,
                routes,
                sequence,
                ..
            } = spec
            {
                if routes.is_empty() {
                    return Err(ScriptError::InvalidWorker {
                        worker: name.clone(),
                        message: "router declares no routes".to_string(),
                    });
                }
                if sequence.is_empty() {
                    return Err(ScriptError::InvalidWorker {
                        worker: name.clone(),
                        message: "router has an empty sequence".to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Wire up a fresh set of scripted workers.
    pub fn build(&self) -> WorkflowGraph {
        let mut graph = WorkflowGraph::new();
        for spec in &self.workers {
            match spec {
                WorkerSpec::Task {
                    name,
                    description,
                    calls,
                    reply,
                    next,
                } => {
                    let mut worker = ScriptedTaskWorker::new(name.clone())
                        .with_description(description.clone())
                        .with_calls(calls.iter().cloned());
                    if let Some(reply) = reply {
                        worker = worker.with_reply(reply.clone());
                    }
                    graph.add_task_worker(Arc::new(worker));
                    if let Some(next) = next {
                        graph.add_edge(name, Destination::from_label(next));
                    }
                }
                WorkerSpec::Router {
                    name,
                    routes,
                    sequence,
                    repeat_last,
                    map,
                } => {
                    let mut router =
                        ScriptedRouter::new(name.clone(), routes.clone(), sequence.clone());
                    if *repeat_last {
                        router = router.repeat_last();
                    }
                    graph.add_router(router);
                    if let Some(map) = map {
                        graph.add_conditional_labels(
                            name,
                            map.iter()
                                .map(|(label, to)| (label.clone(), Destination::from_label(to))),
                        );
                    }
                }
            }
        }
        graph.set_entry(&self.entry);
        graph
    }

    pub fn compile(&self) -> Result<CompiledWorkflow, ScriptError> {
        Ok(self.build().compile()?)
    }
}

#[cfg(test)]
#[path = "scripted_tests.rs"]
mod tests;
