//! Poller configuration
//!
//! Sources, later ones winning:
//! 1. built-in defaults
//! 2. an optional config file (any format the `config` crate understands)
//! 3. `LBMON_*` environment variables, `__` separating nested keys
//!    (e.g. `LBMON_ROOTS__CURRENT_CONNECTIONS=1.3.6.1.4.1.7146.1.2.2.2.1.9`)
//!
//! A `.env` file in the working directory is loaded into the environment first.

use crate::metering::MetricRoots;
use anyhow::{Context, Result};
use lbmon_common::{
    DEFAULT_COMMUNITY, DEFAULT_INITIAL_BACKOFF_MS, DEFAULT_MAX_RETRIES,
    DEFAULT_REPORT_INTERVAL_MS, DEFAULT_REQUEST_ID_MAX, DEFAULT_SNMP_PORT, DEFAULT_TIMEOUT_MS,
};
use lbmon_snmp::{RequestSequence, WalkConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "LBMON";

/// Poller settings for one agent
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Agent host name or address
    pub host: String,
    /// Agent UDP port
    pub port: u16,
    /// SNMP community string
    pub community: String,
    /// Resends allowed for one unanswered request
    pub max_retries: u32,
    /// First backoff delay; doubles on every resend
    pub initial_backoff_ms: u64,
    /// Per-attempt response timeout
    pub timeout_ms: u64,
    /// How often a running walk logs its datagram count
    pub report_interval_ms: u64,
    /// Request ids wrap to zero at this value
    pub request_id_max: u32,
    /// Walk the six metric columns concurrently
    pub parallel_walks: bool,
    /// Column roots for each metric
    pub roots: MetricRoots,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_SNMP_PORT,
            community: DEFAULT_COMMUNITY.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff_ms: DEFAULT_INITIAL_BACKOFF_MS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            report_interval_ms: DEFAULT_REPORT_INTERVAL_MS,
            request_id_max: DEFAULT_REQUEST_ID_MAX,
            parallel_walks: false,
            roots: MetricRoots::default(),
        }
    }
}

// The community string is a credential; keep it out of logs
impl fmt::Debug for PollerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("community", &"<redacted>")
            .field("max_retries", &self.max_retries)
            .field("initial_backoff_ms", &self.initial_backoff_ms)
            .field("timeout_ms", &self.timeout_ms)
            .field("report_interval_ms", &self.report_interval_ms)
            .field("request_id_max", &self.request_id_max)
            .field("parallel_walks", &self.parallel_walks)
            .field("roots", &self.roots)
            .finish()
    }
}

impl PollerConfig {
    /// Load configuration from `.env`, an optional file and the environment
    pub fn load(path: Option<&str>) -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        );

        let cfg: Self = builder
            .build()
            .context("reading configuration sources")?
            .try_deserialize()
            .context("parsing configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings no walk could run with
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            anyhow::bail!("host must not be empty");
        }
        if self.timeout_ms == 0 {
            anyhow::bail!("timeout_ms must be positive");
        }
        self.request_sequence()?;
        Ok(())
    }

    /// Walk settings derived from this config
    pub fn walk_config(&self) -> WalkConfig {
        WalkConfig {
            community: self.community.clone(),
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            timeout: Duration::from_millis(self.timeout_ms),
            report_interval: Duration::from_millis(self.report_interval_ms),
        }
    }

    /// Fresh request id sequence with the configured wrap point
    pub fn request_sequence(&self) -> Result<RequestSequence> {
        RequestSequence::with_max(self.request_id_max).map_err(Into::into)
    }
}
