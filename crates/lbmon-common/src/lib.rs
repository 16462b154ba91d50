//! # lbmon Common
//!
//! Shared types and errors for the lbmon load-balancer usage poller.
//!
//! ## Core Types
//!
//! - [`Oid`]: SNMP object identifier, ordered arc by arc
//! - [`CounterBinding`]: one counter value reported under an [`Oid`]
//! - [`SnmpError`]: the three terminal walk failures plus configuration errors

pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{Result, SnmpError};
pub use types::{
    binding::CounterBinding,
    oid::{Oid, OidParseError},
};

/// lbmon version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Community string used when none is configured
pub const DEFAULT_COMMUNITY: &str = "public";

/// Default SNMP agent port
pub const DEFAULT_SNMP_PORT: u16 = 161;

/// Retries allowed per walk before giving up
pub const DEFAULT_MAX_RETRIES: u32 = 13;

/// First backoff delay in milliseconds (doubles on every retry)
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 1;

/// Per-attempt response timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

/// How often a running walk logs its datagram count, in milliseconds
pub const DEFAULT_REPORT_INTERVAL_MS: u64 = 1000;

/// Request ids wrap back to zero when they reach this value
pub const DEFAULT_REQUEST_ID_MAX: u32 = i32::MAX as u32;

/// Number of leading arcs in a virtual-server counter oid before the name
pub const VS_NAME_PREFIX_ARCS: usize = 14;
