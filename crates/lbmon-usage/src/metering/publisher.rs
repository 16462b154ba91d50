//! Snapshot hand-off
//!
//! The aggregator owns no state between cycles. Each finished snapshot goes
//! to a publisher; a failed cycle is logged and skipped, and the next
//! scheduled poll tries again.

use super::aggregator::UsageAggregator;
use super::record::UsageSnapshot;
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use lbmon_snmp::Walker;
use std::io::Write;
use std::sync::Mutex;
use tracing::{info, instrument, warn};

/// Consumer of finished usage snapshots
#[async_trait]
pub trait UsagePublisher: Send + Sync {
    async fn publish(&self, snapshot: &UsageSnapshot) -> anyhow::Result<()>;
}

/// Writes each snapshot as pretty-printed JSON
pub struct JsonPublisher<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonPublisher<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Recover the writer
    pub fn into_inner(self) -> anyhow::Result<W> {
        self.out
            .into_inner()
            .map_err(|_| anyhow!("publisher writer lock poisoned"))
    }
}

#[async_trait]
impl<W: Write + Send> UsagePublisher for JsonPublisher<W> {
    async fn publish(&self, snapshot: &UsageSnapshot) -> anyhow::Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| anyhow!("publisher writer lock poisoned"))?;
        serde_json::to_writer_pretty(&mut *out, snapshot).context("serializing usage snapshot")?;
        writeln!(out)?;
        out.flush()?;
        Ok(())
    }
}

/// Run one polling cycle: collect a snapshot and publish it
#[instrument(skip_all)]
pub async fn poll_once<W, P>(
    aggregator: &UsageAggregator<W>,
    publisher: &P,
) -> anyhow::Result<UsageSnapshot>
where
    W: Walker,
    P: UsagePublisher + ?Sized,
{
    let snapshot = match aggregator.collect_snapshot().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(kind = e.kind(), error = %e, "Usage collection failed, skipping cycle");
            return Err(e.into());
        }
    };

    publisher
        .publish(&snapshot)
        .await
        .context("publishing usage snapshot")?;

    info!(
        endpoint = %snapshot.endpoint,
        virtual_servers = snapshot.records.len(),
        "Published usage snapshot"
    );
    Ok(snapshot)
}
