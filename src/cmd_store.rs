//! `inspect` and `clear` subcommand handlers.

use tracing::info;

use caldron_config::Config;
use caldron_stores::{StagingArea, StoreKind};

use crate::register::build_engine;

/// Print the session's snapshots as pretty JSON.
pub(crate) async fn inspect(
    config: &Config,
    session: &str,
    only: Option<StoreKind>,
) -> anyhow::Result<()> {
    let engine = build_engine(config).await?;
    let stores = engine.sessions.for_session(session);
    let kinds = match only {
        Some(kind) => vec![kind],
        None => StoreKind::ALL.to_vec(),
    };

    for kind in kinds {
        println!("== {} ({})", kind, stores.snapshot_name(kind));
        match stores.raw_snapshot(kind).await? {
            Some(raw) => {
                let value: serde_json::Value = serde_json::from_str(&raw)?;
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
            None => println!("(empty)"),
        }
    }
    Ok(())
}

/// Empty the session's staging area.
pub(crate) async fn clear(config: &Config, session: &str) -> anyhow::Result<()> {
    let engine = build_engine(config).await?;
    let (documents, references) = engine
        .sessions
        .for_session(session)
        .mutate(|staging: &mut StagingArea| {
            let counts = (staging.documents_len(), staging.references_len());
            staging.clear();
            counts
        })
        .await?;
    info!("Cleared staging for session '{}'", session);
    println!(
        "Cleared {} document(s) and {} reference(s) from session '{}'",
        documents, references, session
    );
    Ok(())
}
