//! # lbmon Usage
//!
//! Per-virtual-server usage collection for load-balancer appliances.
//!
//! One polling cycle walks six counter columns on the appliance's SNMP agent
//! (current connections, total connections and the hi/lo halves of bytes in
//! and bytes out), decodes the virtual-server name from every row oid and
//! merges the rows into one [`UsageRecord`] per virtual server.
//!
//! ## Byte Counters
//!
//! ```text
//! bytes = hi * 2^32 + lo
//! ```
//!
//! The agent reports each byte counter as two 32-bit halves. Records keep
//! them as reported; [`UsageRecord::bytes_in`] and [`UsageRecord::bytes_out`]
//! combine them.

pub mod codec;
pub mod config;
pub mod metering;

pub use config::PollerConfig;
pub use metering::{
    poll_once, JsonPublisher, Metric, MetricRoots, UsageAggregator, UsageMap, UsagePublisher,
    UsageRecord, UsageSnapshot,
};
