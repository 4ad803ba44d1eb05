//! Caldron - multi-worker orchestration engine.
//!
//! Main entry point for the Caldron CLI.

mod cli;
mod cmd_run;
mod cmd_store;
mod register;

use clap::Parser;
use tracing::warn;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use caldron_config::{ConfigLoader, ConfigValidator, LoggingConfig};

use crate::cli::{Cli, Commands};

/// Console logging, plus a daily log file when a log directory is configured.
fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = match &logging.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("caldron")
                .filename_suffix("log")
                .max_log_files(30)
                .build(dir)?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            // The guard flushes the file writer on drop; keep it for the whole run.
            static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
                std::sync::OnceLock::new();
            let _ = GUARD.set(guard);

            Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
        }
        None => None,
    };

    let json_layer = logging
        .json
        .then(|| fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!logging.json).then(|| {
        fmt::layer()
            .with_target(true)
            .with_ansi(true)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(file_layer)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::load_or_default(&cli.config)?;
    init_tracing(&config.logging)?;

    let checked = ConfigValidator::validate(&config);
    for warning in &checked.warnings {
        warn!("Config {}: {}", warning.path, warning.message);
    }
    if !checked.is_valid() {
        if let Commands::Validate { script } = &cli.command {
            return cmd_run::validate(&config, script);
        }
        let errors: Vec<String> = checked.errors.iter().map(ToString::to_string).collect();
        anyhow::bail!("Invalid configuration: {}", errors.join("; "));
    }

    match cli.command {
        Commands::Run {
            script,
            budget,
            message,
        } => cmd_run::run_script(&config, &cli.session, &script, budget, &message).await,
        Commands::Inspect { store } => {
            cmd_store::inspect(&config, &cli.session, store.map(Into::into)).await
        }
        Commands::Clear => cmd_store::clear(&config, &cli.session).await,
        Commands::Validate { script } => cmd_run::validate(&config, &script),
    }
}
