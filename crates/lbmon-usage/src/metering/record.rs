//! Per-virtual-server usage records
//!
//! A record collects the six counters polled for one virtual server. Each
//! field is set independently by its own walk, so any subset may be present.

use chrono::{DateTime, Utc};
use lbmon_common::Oid;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Usage records keyed by virtual-server name
pub type UsageMap = BTreeMap<String, UsageRecord>;

/// One polled counter column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Connections open right now
    ConcurrentConnections,
    /// Connections since the counter was last reset
    TotalConnections,
    /// High 32 bits of bytes received
    BytesInHi,
    /// Low 32 bits of bytes received
    BytesInLo,
    /// High 32 bits of bytes sent
    BytesOutHi,
    /// Low 32 bits of bytes sent
    BytesOutLo,
}

impl Metric {
    /// Every metric, in the order walks run
    pub const ALL: [Metric; 6] = [
        Metric::ConcurrentConnections,
        Metric::TotalConnections,
        Metric::BytesInHi,
        Metric::BytesInLo,
        Metric::BytesOutHi,
        Metric::BytesOutLo,
    ];
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::ConcurrentConnections => write!(f, "concurrent_connections"),
            Metric::TotalConnections => write!(f, "total_connections"),
            Metric::BytesInHi => write!(f, "bytes_in_hi"),
            Metric::BytesInLo => write!(f, "bytes_in_lo"),
            Metric::BytesOutHi => write!(f, "bytes_out_hi"),
            Metric::BytesOutLo => write!(f, "bytes_out_lo"),
        }
    }
}

/// Combine the halves of a split 64-bit counter: `hi * 2^32 + lo`.
///
/// `None` if the result does not fit in a `u64`, which only happens when a
/// half is outside `[0, 2^32)`.
pub fn combine_hi_lo(hi: u64, lo: u64) -> Option<u64> {
    hi.checked_mul(1 << 32)?.checked_add(lo)
}

/// Raw usage counters for one virtual server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    /// Decoded virtual-server name
    pub vs_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrent_connections: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_connections: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_in_hi: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_in_lo: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_out_hi: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_out_lo: Option<u64>,
}

impl UsageRecord {
    /// Empty record for a virtual server
    pub fn new(vs_name: impl Into<String>) -> Self {
        Self {
            vs_name: vs_name.into(),
            ..Self::default()
        }
    }

    fn slot(&mut self, metric: Metric) -> &mut Option<u64> {
        match metric {
            Metric::ConcurrentConnections => &mut self.concurrent_connections,
            Metric::TotalConnections => &mut self.total_connections,
            Metric::BytesInHi => &mut self.bytes_in_hi,
            Metric::BytesInLo => &mut self.bytes_in_lo,
            Metric::BytesOutHi => &mut self.bytes_out_hi,
            Metric::BytesOutLo => &mut self.bytes_out_lo,
        }
    }

    /// Set one counter, replacing any earlier value
    pub fn set(&mut self, metric: Metric, value: u64) {
        *self.slot(metric) = Some(value);
    }

    /// Read one counter
    pub fn get(&self, metric: Metric) -> Option<u64> {
        match metric {
            Metric::ConcurrentConnections => self.concurrent_connections,
            Metric::TotalConnections => self.total_connections,
            Metric::BytesInHi => self.bytes_in_hi,
            Metric::BytesInLo => self.bytes_in_lo,
            Metric::BytesOutHi => self.bytes_out_hi,
            Metric::BytesOutLo => self.bytes_out_lo,
        }
    }

    /// Total bytes received, when both halves were reported
    pub fn bytes_in(&self) -> Option<u64> {
        combine_hi_lo(self.bytes_in_hi?, self.bytes_in_lo?)
    }

    /// Total bytes sent, when both halves were reported
    pub fn bytes_out(&self) -> Option<u64> {
        combine_hi_lo(self.bytes_out_hi?, self.bytes_out_lo?)
    }
}

/// Column roots walked for each metric
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricRoots {
    pub current_connections: Oid,
    pub total_connections: Oid,
    pub bytes_in_hi: Oid,
    pub bytes_in_lo: Oid,
    pub bytes_out_hi: Oid,
    pub bytes_out_lo: Oid,
}

impl MetricRoots {
    /// Root oid walked for `metric`
    pub fn root(&self, metric: Metric) -> &Oid {
        match metric {
            Metric::ConcurrentConnections => &self.current_connections,
            Metric::TotalConnections => &self.total_connections,
            Metric::BytesInHi => &self.bytes_in_hi,
            Metric::BytesInLo => &self.bytes_in_lo,
            Metric::BytesOutHi => &self.bytes_out_hi,
            Metric::BytesOutLo => &self.bytes_out_lo,
        }
    }
}

/// ZXTM virtual-server table column
fn vs_column(column: u32) -> Oid {
    Oid::new(vec![1, 3, 6, 1, 4, 1, 7146, 1, 2, 2, 2, 1, column])
}

impl Default for MetricRoots {
    fn default() -> Self {
        Self {
            current_connections: vs_column(9),
            total_connections: vs_column(11),
            bytes_in_hi: vs_column(6),
            bytes_in_lo: vs_column(5),
            bytes_out_hi: vs_column(8),
            bytes_out_lo: vs_column(7),
        }
    }
}

/// Usage collected from one agent in one polling cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSnapshot {
    /// When collection finished
    pub collected_at: DateTime<Utc>,
    /// Agent endpoint that was polled
    pub endpoint: String,
    /// Records keyed by virtual-server name
    pub records: UsageMap,
}
