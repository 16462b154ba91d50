//! Metering module
//!
//! Provides usage collection and hand-off:
//! - UsageAggregator: walks every metric column and merges rows per virtual server
//! - UsagePublisher: receives the finished snapshot

pub mod aggregator;
pub mod publisher;
pub mod record;

pub use aggregator::UsageAggregator;
pub use publisher::{poll_once, JsonPublisher, UsagePublisher};
pub use record::{combine_hi_lo, Metric, MetricRoots, UsageMap, UsageRecord, UsageSnapshot};
