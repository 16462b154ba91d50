//! Usage aggregation across metric walks
//!
//! Runs one walk per metric column and merges the bindings into one record
//! per virtual server, keyed by the name decoded from each row oid.

use super::record::{Metric, MetricRoots, UsageMap, UsageRecord, UsageSnapshot};
use crate::codec;
use futures::future::try_join_all;
use lbmon_common::{CounterBinding, Result};
use lbmon_snmp::Walker;
use tracing::{debug, info, instrument};

/// Usage aggregator
pub struct UsageAggregator<W> {
    walker: W,
    roots: MetricRoots,
    /// Run the six walks concurrently instead of one after another
    parallel: bool,
}

impl<W: Walker> UsageAggregator<W> {
    /// Create an aggregator that walks sequentially
    pub fn new(walker: W, roots: MetricRoots) -> Self {
        Self {
            walker,
            roots,
            parallel: false,
        }
    }

    /// Run the metric walks concurrently. The resulting map is the same.
    pub fn with_parallel_walks(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn walker(&self) -> &W {
        &self.walker
    }

    /// Walk every metric column and merge the results by virtual-server name.
    ///
    /// Any walk failure fails the whole call; no partial map is returned.
    #[instrument(skip(self), fields(agent = %self.walker.endpoint(), parallel = self.parallel))]
    pub async fn collect_usage(&self) -> Result<UsageMap> {
        let mut usage = UsageMap::new();

        if self.parallel {
            let walks = Metric::ALL
                .iter()
                .map(|metric| self.walker.walk(self.roots.root(*metric)));
            let results = try_join_all(walks).await?;
            for (metric, bindings) in Metric::ALL.iter().zip(results) {
                merge(&mut usage, *metric, &bindings);
            }
        } else {
            for metric in Metric::ALL {
                let bindings = self.walker.walk(self.roots.root(metric)).await?;
                merge(&mut usage, metric, &bindings);
            }
        }

        info!(virtual_servers = usage.len(), "Collected usage");
        Ok(usage)
    }

    /// Collect usage and stamp it with the time and agent endpoint
    pub async fn collect_snapshot(&self) -> Result<UsageSnapshot> {
        let records = self.collect_usage().await?;
        Ok(UsageSnapshot {
            collected_at: chrono::Utc::now(),
            endpoint: self.walker.endpoint(),
            records,
        })
    }
}

/// Fold one walk's bindings into the map
fn merge(usage: &mut UsageMap, metric: Metric, bindings: &[CounterBinding]) {
    for binding in bindings {
        let name = codec::decode(&binding.oid);
        usage
            .entry(name)
            .or_insert_with_key(|name| UsageRecord::new(name.clone()))
            .set(metric, binding.value);
    }
    debug!(%metric, bindings = bindings.len(), "Merged metric walk");
}
