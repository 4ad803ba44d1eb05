//! `run` and `validate` subcommand handlers.

use std::path::Path;
use std::sync::Arc;

use anyhow::bail;
use tracing::{info, warn};

use caldron_config::{Config, ConfigValidator};
use caldron_workflow::{Orchestrator, WorkflowScript};

use crate::register::build_engine;

/// Run a scripted workflow for one request and print the transcript.
pub(crate) async fn run_script(
    config: &Config,
    session: &str,
    script: &Path,
    budget: Option<u32>,
    message: &str,
) -> anyhow::Result<()> {
    let workflow = WorkflowScript::load(script)?.compile()?;
    let engine = build_engine(config).await?;
    let orchestrator = Orchestrator::from_config(
        Arc::new(workflow),
        engine.bridge.clone(),
        &config.orchestrator,
    );

    let budget = budget.unwrap_or(config.orchestrator.step_budget);
    info!("Running {} for session '{}'", script.display(), session);
    let report = orchestrator.run_request(session, message, budget).await;

    for message in &report.state.messages {
        println!("[{}] {}", message.author, message.content);
    }
    println!();
    println!("Trace: {}", report.trace.join(" -> "));
    println!("Outcome: {} ({} step(s))", report.outcome, report.steps);

    if !report.outcome.is_success() {
        if report.outcome.is_retryable() {
            warn!("The run may succeed if started again");
        }
        bail!("Run did not finish: {}", report.outcome);
    }
    Ok(())
}

/// Report every problem in the configuration and the workflow script.
pub(crate) fn validate(config: &Config, script: &Path) -> anyhow::Result<()> {
    let mut failed = false;

    let checked = ConfigValidator::validate(config);
    for warning in &checked.warnings {
        println!("warning: {}: {}", warning.path, warning.message);
    }
    for error in &checked.errors {
        println!("error: {}", error);
        failed = true;
    }

    let problems = WorkflowScript::load(script)?.build().problems();
    for problem in &problems {
        println!("error: {}", problem);
    }
    failed |= !problems.is_empty();

    if failed {
        bail!("Validation failed for {}", script.display());
    }
    println!("{} is valid", script.display());
    Ok(())
}
