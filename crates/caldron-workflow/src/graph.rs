//! Workflow graph construction and compile-time checks.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use caldron_protocols::{
    ConversationState, Destination, RouteSet, RouterWorker, TaskWorker, WorkerContext, WorkerError,
};

use crate::error::GraphBuildError;

/// Router with its route type erased to labels.
#[async_trait]
pub(crate) trait DynRouter: Send + Sync {
    fn name(&self) -> &str;

    fn route_labels(&self) -> Vec<String>;

    async fn decide_label(
        &self,
        state: &ConversationState,
        ctx: &WorkerContext,
    ) -> Result<String, WorkerError>;
}

struct RouterAdapter<R>(R);

#[async_trait]
impl<R: RouterWorker> DynRouter for RouterAdapter<R> {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn route_labels(&self) -> Vec<String> {
        self.0
            .routes()
            .iter()
            .map(|r| r.label().to_string())
            .collect()
    }

    async fn decide_label(
        &self,
        state: &ConversationState,
        ctx: &WorkerContext,
    ) -> Result<String, WorkerError> {
        let route = self.0.decide(state, ctx).await?;
        let label = route.label().to_string();
        if !self.route_labels().contains(&label) {
            return Err(WorkerError::UnknownRoute {
                worker: self.name().to_string(),
                label,
            });
        }
        Ok(label)
    }
}

#[derive(Clone)]
pub(crate) enum WorkerSlot {
    Task(Arc<dyn TaskWorker>),
    Router(Arc<dyn DynRouter>),
}

impl WorkerSlot {
    fn kind(&self) -> &'static str {
        match self {
            WorkerSlot::Task(_) => "task worker",
            WorkerSlot::Router(_) => "router",
        }
    }
}

/// Outgoing edge of one worker.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Edge {
    Direct(Destination),
    /// Route label to destination. Looked up exactly; there is no fallback.
    Conditional(Vec<(String, Destination)>),
}

impl Edge {
    fn targets(&self) -> Vec<&Destination> {
        match self {
            Edge::Direct(to) => vec![to],
            Edge::Conditional(map) => map.iter().map(|(_, to)| to).collect(),
        }
    }

    /// Destination for `label`. Unconditional edges ignore it.
    pub(crate) fn lookup(&self, label: &str) -> Option<&Destination> {
        match self {
            Edge::Direct(to) => Some(to),
            Edge::Conditional(map) => map.iter().find(|(l, _)| l == label).map(|(_, to)| to),
        }
    }
}

/// Builder for a workflow.
///
/// Nothing is checked while building; [`compile`](Self::compile) reports
/// the first problem and [`problems`](Self::problems) reports all of them.
#[derive(Default)]
pub struct WorkflowGraph {
    workers: Vec<(String, WorkerSlot)>,
    edges: Vec<(String, Edge)>,
    entry: Option<String>,
}

impl WorkflowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_task_worker(&mut self, worker: Arc<dyn TaskWorker>) -> &mut Self {
        self.workers
            .push((worker.name().to_string(), WorkerSlot::Task(worker)));
        self
    }

    pub fn add_router<R: RouterWorker + 'static>(&mut self, router: R) -> &mut Self {
        let name = router.name().to_string();
        self.workers
            .push((name, WorkerSlot::Router(Arc::new(RouterAdapter(router)))));
        self
    }

    /// Unconditional hand-off from `from` to `to`.
    pub fn add_edge(&mut self, from: &str, to: Destination) -> &mut Self {
        self.edges.push((from.to_string(), Edge::Direct(to)));
        self
    }

    /// Route-keyed hand-off from the router `from`.
    pub fn add_conditional_edge<R, I>(&mut self, from: &str, map: I) -> &mut Self
    where
        R: RouteSet,
        I: IntoIterator<Item = (R, Destination)>,
    {
        let map = map
            .into_iter()
            .map(|(route, to)| (route.label().to_string(), to));
        self.add_conditional_labels(from, map)
    }

    /// Label-keyed form of [`add_conditional_edge`](Self::add_conditional_edge).
    pub fn add_conditional_labels<I>(&mut self, from: &str, map: I) -> &mut Self
    where
        I: IntoIterator<Item = (String, Destination)>,
    {
        self.edges
            .push((from.to_string(), Edge::Conditional(map.into_iter().collect())));
        self
    }

    pub fn set_entry(&mut self, name: &str) -> &mut Self {
        self.entry = Some(name.to_string());
        self
    }

    pub fn worker_names(&self) -> Vec<&str> {
        self.workers.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Every structural problem, in a stable order.
    pub fn problems(&self) -> Vec<GraphBuildError> {
        let mut problems = Vec::new();

        let mut slots: HashMap<&str, &WorkerSlot> = HashMap::new();
        for (name, slot) in &self.workers {
            if slots.insert(name.as_str(), slot).is_some() {
                problems.push(GraphBuildError::DuplicateWorker(name.clone()));
            }
        }

        match &self.entry {
            None => problems.push(GraphBuildError::NoEntry),
            Some(entry) if !slots.contains_key(entry.as_str()) => {
                problems.push(GraphBuildError::UnknownWorker(entry.clone()));
            }
            Some(_) => {}
        }

        let mut outgoing: HashMap<&str, Vec<&Edge>> = HashMap::new();
        for (from, edge) in &self.edges {
            if !slots.contains_key(from.as_str()) {
                problems.push(GraphBuildError::UnknownWorker(from.clone()));
                continue;
            }
            for target in edge.targets() {
                if let Destination::Worker(to) = target {
                    if !slots.contains_key(to.as_str()) {
                        problems.push(GraphBuildError::UnknownWorker(to.clone()));
                    }
                }
            }
            outgoing.entry(from.as_str()).or_default().push(edge);
        }

        let mut seen = HashSet::new();
        for (name, slot) in &self.workers {
            if !seen.insert(name.as_str()) {
                continue;
            }
            match outgoing.get(name.as_str()).map(Vec::as_slice) {
                None | Some([]) => problems.push(GraphBuildError::MissingEdge(name.clone())),
                Some([edge]) => {
                    let expected = match (slot, edge) {
                        (WorkerSlot::Task(_), Edge::Conditional(_)) => Some("unconditional"),
                        (WorkerSlot::Router(_), Edge::Direct(_)) => Some("conditional"),
                        _ => None,
                    };
                    if let Some(expected) = expected {
                        problems.push(GraphBuildError::EdgeKindMismatch {
                            worker: name.clone(),
                            kind: slot.kind(),
                            expected,
                        });
                    }
                }
                Some(_) => problems.push(GraphBuildError::ConflictingEdges(name.clone())),
            }
        }

        if let Some(cycle) = self.unconditional_cycle() {
            problems.push(GraphBuildError::UnconditionalCycle(cycle));
        }
        problems
    }

    /// A loop made only of unconditional edges, if one exists.
    fn unconditional_cycle(&self) -> Option<Vec<String>> {
        let mut next: HashMap<&str, &str> = HashMap::new();
        for (from, edge) in &self.edges {
            if let Edge::Direct(Destination::Worker(to)) = edge {
                next.entry(from.as_str()).or_insert(to.as_str());
            }
        }

        let mut done: HashSet<&str> = HashSet::new();
        for (start, _) in &self.workers {
            let mut path: Vec<&str> = Vec::new();
            let mut node = start.as_str();
            loop {
                if done.contains(node) {
                    break;
                }
                if let Some(pos) = path.iter().position(|n| *n == node) {
                    let mut cycle: Vec<String> = path[pos..].iter().map(|n| n.to_string()).collect();
                    cycle.push(node.to_string());
                    return Some(cycle);
                }
                path.push(node);
                match next.get(node) {
                    Some(to) => node = *to,
                    None => break,
                }
            }
            done.extend(path);
        }
        None
    }

    /// Check the graph and freeze it for running.
    pub fn compile(self) -> Result<CompiledWorkflow, GraphBuildError> {
        if let Some(problem) = self.problems().into_iter().next() {
            return Err(problem);
        }
        let Some(entry) = self.entry else {
            return Err(GraphBuildError::NoEntry);
        };

        let mut edges: HashMap<String, Edge> = self.edges.into_iter().collect();
        let mut nodes = HashMap::new();
        for (name, worker) in self.workers {
            let edge = edges
                .remove(&name)
                .ok_or_else(|| GraphBuildError::MissingEdge(name.clone()))?;
            if let (WorkerSlot::Router(router), Edge::Conditional(map)) = (&worker, &edge) {
                for label in router.route_labels() {
                    if !map.iter().any(|(l, _)| *l == label) {
                        warn!(
                            "Router '{}' can produce route '{}' which has no destination",
                            name, label
                        );
                    }
                }
            }
            debug!("Compiled worker '{}' ({})", name, worker.kind());
            nodes.insert(name, Node { worker, edge });
        }

        info!(
            "Workflow compiled: {} worker(s), entry '{}'",
            nodes.len(),
            entry
        );
        Ok(CompiledWorkflow { entry, nodes })
    }
}

pub(crate) struct Node {
    pub(crate) worker: WorkerSlot,
    pub(crate) edge: Edge,
}

/// A checked workflow, ready to run.
pub struct CompiledWorkflow {
    entry: String,
    nodes: HashMap<String, Node>,
}

impl CompiledWorkflow {
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Worker names, sorted.
    pub fn worker_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }
}

impl fmt::Debug for CompiledWorkflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledWorkflow")
            .field("entry", &self.entry)
            .field("workers", &self.worker_names())
            .finish()
    }
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
