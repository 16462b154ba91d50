//! Error types for lbmon
//!
//! A walk ends in one of three terminal failures. None of them is recovered
//! below the walk boundary; the aggregator aborts the whole cycle on any.

use std::error::Error as StdError;
use thiserror::Error;

/// Result type alias using SnmpError
pub type Result<T> = std::result::Result<T, SnmpError>;

/// Boxed underlying cause carried by a general failure
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Unified error type for polling operations
#[derive(Debug, Error)]
pub enum SnmpError {
    /// The local transport could not be created or bound. Never retried.
    #[error("Setup error: {message}: {source}")]
    Setup {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// No response arrived within the retry budget for one outstanding request
    #[error("Retry budget exceeded after {packets_sent} datagrams sent ({retries} retries)")]
    RetryExceeded { packets_sent: u32, retries: u32 },

    /// Any other fault: send or receive error, close error, unusable response
    #[error("SNMP error: {message}")]
    General {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SnmpError {
    /// Setup failure wrapping an I/O cause
    pub fn setup(message: impl Into<String>, source: std::io::Error) -> Self {
        SnmpError::Setup {
            message: message.into(),
            source,
        }
    }

    /// General failure wrapping an underlying cause
    pub fn general(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        SnmpError::General {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// General failure with no underlying cause
    pub fn general_msg(message: impl Into<String>) -> Self {
        SnmpError::General {
            message: message.into(),
            source: None,
        }
    }

    /// Short, stable name of the failure kind for logs
    pub fn kind(&self) -> &'static str {
        match self {
            SnmpError::Setup { .. } => "setup",
            SnmpError::RetryExceeded { .. } => "retry_exceeded",
            SnmpError::General { .. } => "general",
            SnmpError::Config(_) => "config",
        }
    }
}
