//! CounterBinding - one counter reported by a walk

use super::oid::Oid;
use serde::{Deserialize, Serialize};

/// A counter oid paired with the value the agent reported for it
///
/// Produced only by a walk and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterBinding {
    /// Full counter oid (column root + row index)
    pub oid: Oid,
    /// Reported value
    pub value: u64,
}

impl CounterBinding {
    pub fn new(oid: Oid, value: u64) -> Self {
        Self { oid, value }
    }
}
