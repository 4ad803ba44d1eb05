//! CLI definitions for Caldron.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use caldron_stores::StoreKind;

/// Caldron CLI.
#[derive(Parser)]
#[command(name = "caldron")]
#[command(about = "Multi-worker orchestration engine for collaborative result documents")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (defaults apply when it does not exist)
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    /// Session whose stores are used
    #[arg(short, long, default_value = "default", global = true, env = "CALDRON_SESSION")]
    pub session: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run a scripted workflow for one request
    Run {
        /// Workflow script (TOML)
        #[arg(long)]
        script: PathBuf,

        /// Step budget (overrides the configured one)
        #[arg(long)]
        budget: Option<u32>,

        /// The user request that starts the run
        message: String,
    },

    /// Print the session's stores as JSON
    Inspect {
        /// Only this store
        #[arg(long, value_enum)]
        store: Option<StoreArg>,
    },

    /// Clear the session's staging area
    Clear,

    /// Check a workflow script and the configuration
    Validate {
        /// Workflow script (TOML)
        #[arg(long)]
        script: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum StoreArg {
    Staging,
    Graph,
    Changes,
}

impl From<StoreArg> for StoreKind {
    fn from(arg: StoreArg) -> Self {
        match arg {
            StoreArg::Staging => StoreKind::Staging,
            StoreArg::Graph => StoreKind::Graph,
            StoreArg::Changes => StoreKind::Changes,
        }
    }
}
