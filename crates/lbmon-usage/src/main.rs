//! lbmon - one-shot usage poll
//!
//! Walks the configured appliance once and prints the usage snapshot as JSON
//! on stdout. Scheduling is left to the caller (cron, a job runner, ...).

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lbmon_common::VERSION;
use lbmon_snmp::SnmpWalker;
use lbmon_usage::{poll_once, JsonPublisher, PollerConfig, UsageAggregator};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; stdout carries the snapshot, so logs go to stderr
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting lbmon v{}", VERSION);

    // Load configuration
    let config_path = std::env::args().nth(1);
    let config = PollerConfig::load(config_path.as_deref())?;
    info!("Loaded configuration: {:?}", config);

    let sequence = Arc::new(config.request_sequence()?);
    let walker = SnmpWalker::udp(config.host.clone(), config.port, sequence, config.walk_config());
    info!("Polling {}", walker);

    let aggregator =
        UsageAggregator::new(walker, config.roots.clone()).with_parallel_walks(config.parallel_walks);
    let publisher = JsonPublisher::new(std::io::stdout());

    let snapshot = poll_once(&aggregator, &publisher).await?;
    info!(
        virtual_servers = snapshot.records.len(),
        "Poll complete"
    );

    Ok(())
}
