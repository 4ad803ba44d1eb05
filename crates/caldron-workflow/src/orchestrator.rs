//! The step loop that drives a conversation through a compiled workflow.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, info};

use caldron_config::OrchestratorConfig;
use caldron_protocols::{ConversationState, Destination, ToolInvoker, WorkerContext, WorkerError};

use crate::graph::{CompiledWorkflow, WorkerSlot};

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The terminal destination was reached.
    Success,
    /// A router produced a route with no destination, or one it never declared.
    ConfigurationError { worker: String, detail: String },
    /// The step budget ran out before the terminal destination.
    BudgetExceeded { steps: u32 },
    /// A worker's own collaborator failed, or the step timed out.
    WorkerFailed { worker: String, error: String },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success)
    }

    /// Whether starting a fresh run could plausibly end differently.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RunOutcome::BudgetExceeded { .. } | RunOutcome::WorkerFailed { .. }
        )
    }
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunOutcome::Success => write!(f, "success"),
            RunOutcome::ConfigurationError { worker, detail } => {
                write!(f, "configuration error in '{}': {}", worker, detail)
            }
            RunOutcome::BudgetExceeded { steps } => {
                write!(f, "step budget exceeded after {} step(s)", steps)
            }
            RunOutcome::WorkerFailed { worker, error } => {
                write!(f, "worker '{}' failed: {}", worker, error)
            }
        }
    }
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub state: ConversationState,
    pub outcome: RunOutcome,
    /// Worker invocations performed.
    pub steps: u32,
    /// Worker names in the order they ran.
    pub trace: Vec<String>,
}

/// Runs a compiled workflow, one worker at a time.
pub struct Orchestrator {
    workflow: Arc<CompiledWorkflow>,
    tools: Arc<dyn ToolInvoker>,
    step_timeout: Option<Duration>,
}

impl Orchestrator {
    pub fn new(workflow: Arc<CompiledWorkflow>, tools: Arc<dyn ToolInvoker>) -> Self {
        Self {
            workflow,
            tools,
            step_timeout: None,
        }
    }

    pub fn from_config(
        workflow: Arc<CompiledWorkflow>,
        tools: Arc<dyn ToolInvoker>,
        config: &OrchestratorConfig,
    ) -> Self {
        let orchestrator = Self::new(workflow, tools);
        match config.step_timeout_secs {
            Some(secs) => orchestrator.with_step_timeout(Duration::from_secs(secs)),
            None => orchestrator,
        }
    }

    /// Bound each worker invocation.
    pub fn with_step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = Some(timeout);
        self
    }

    pub fn workflow(&self) -> &Arc<CompiledWorkflow> {
        &self.workflow
    }

    /// Start a run from a single user message.
    pub async fn run_request(
        &self,
        session_id: &str,
        user_message: &str,
        step_budget: u32,
    ) -> RunReport {
        let state = ConversationState::new_request(user_message, self.workflow.entry());
        self.run(session_id, state, step_budget).await
    }

    /// Drive `state` through the workflow until the terminal destination,
    /// a fatal outcome, or `step_budget` invocations.
    pub async fn run(
        &self,
        session_id: &str,
        mut state: ConversationState,
        step_budget: u32,
    ) -> RunReport {
        info!(
            "Starting run for session '{}' at '{}' (budget {})",
            session_id,
            self.workflow.entry(),
            step_budget
        );

        let mut current = Destination::worker(self.workflow.entry());
        let mut steps: u32 = 0;
        let mut trace = Vec::new();

        let outcome = loop {
            let name = match &current {
                Destination::End => break RunOutcome::Success,
                Destination::Worker(name) => name.clone(),
            };
            if steps >= step_budget {
                break RunOutcome::BudgetExceeded { steps };
            }
            let Some(node) = self.workflow.node(&name) else {
                break RunOutcome::ConfigurationError {
                    worker: name,
                    detail: "destination is not a registered worker".to_string(),
                };
            };

            let ctx = WorkerContext::new(session_id, steps, self.tools.clone());
            trace.push(name.clone());
            steps += 1;
            debug!("Step {}: invoking '{}'", steps, name);

            let label = match &node.worker {
                WorkerSlot::Task(worker) => {
                    match self.guarded(worker.invoke(&state, &ctx)).await {
                        Ok(reply) => {
                            state.append_message(&name, reply);
                            None
                        }
                        Err(e) => {
                            break RunOutcome::WorkerFailed {
                                worker: name,
                                error: e.to_string(),
                            };
                        }
                    }
                }
                WorkerSlot::Router(router) => {
                    match self.guarded(router.decide_label(&state, &ctx)).await {
                        Ok(label) => {
                            state.set_route(&name, label.clone());
                            Some(label)
                        }
                        Err(e @ WorkerError::UnknownRoute { .. }) => {
                            break RunOutcome::ConfigurationError {
                                worker: name,
                                detail: e.to_string(),
                            };
                        }
                        Err(e) => {
                            break RunOutcome::WorkerFailed {
                                worker: name,
                                error: e.to_string(),
                            };
                        }
                    }
                }
            };

            match node.edge.lookup(label.as_deref().unwrap_or_default()) {
                Some(to) => current = to.clone(),
                None => {
                    break RunOutcome::ConfigurationError {
                        detail: format!(
                            "route '{}' has no destination",
                            label.unwrap_or_default()
                        ),
                        worker: name,
                    };
                }
            }
        };

        if outcome.is_success() {
            info!("Run for session '{}' finished after {} step(s)", session_id, steps);
        } else {
            error!("Run for session '{}' ended: {}", session_id, outcome);
        }

        RunReport {
            state,
            outcome,
            steps,
            trace,
        }
    }

    async fn guarded<T, F>(&self, invocation: F) -> Result<T, WorkerError>
    where
        F: Future<Output = Result<T, WorkerError>>,
    {
        match self.step_timeout {
            Some(limit) => tokio::time::timeout(limit, invocation)
                .await
                .map_err(|_| WorkerError::Timeout(limit.as_secs()))?,
            None => invocation.await,
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
