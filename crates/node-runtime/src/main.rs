//! # Hashgraph Node Runtime
//!
//! Runs a local network of hashgraph nodes in one process.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from `HG_*` environment variables
//! 2. Initialize logging and metrics
//! 3. Build the genesis roster
//! 4. Start every node, each resuming from its own data directory
//! 5. Run until `HG_RUN_SECS` elapses or Ctrl+C
//! 6. Shut down and report each node's final state

use anyhow::{Context, Result};
use hg_telemetry::log_event;
use node_runtime::{load_config, LocalCluster};
use shared_types::short_hash;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config().context("Invalid configuration")?;
    hg_telemetry::init_telemetry(&config.telemetry).context("Failed to initialize telemetry")?;

    info!("===========================================");
    info!("  Hashgraph Node Runtime v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let run_for = config.run_for;
    let cluster = LocalCluster::start(config)
        .await
        .context("Failed to start local cluster")?;

    match run_for {
        Some(duration) => {
            info!(seconds = duration.as_secs(), "Running for a fixed time");
            tokio::time::sleep(duration).await;
        }
        None => {
            info!("Nodes are running. Press Ctrl+C to stop.");
            tokio::signal::ctrl_c().await?;
        }
    }

    let reports = cluster.shutdown().await;
    for report in &reports {
        log_event!(
            info,
            "runtime",
            "Final state",
            node = %report.node,
            round = report.state_round,
            rounds_delivered = report.rounds_delivered,
            transactions = report.transactions_delivered,
            running_hash = %short_hash(&report.running_hash)
        );
    }
    if reports.iter().all(|r| r.rounds_delivered == 0) {
        warn!("No round reached consensus");
    }

    match hg_telemetry::encode_metrics() {
        Ok(metrics) => tracing::debug!(bytes = metrics.len(), "Metrics snapshot taken"),
        Err(e) => warn!(error = %e, "Failed to encode metrics"),
    }
    Ok(())
}
