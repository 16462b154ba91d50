//! Oid - SNMP object identifier
//!
//! An ordered sequence of non-negative arcs. Ordering is lexicographic arc by
//! arc, so a proper prefix sorts before every oid it is a prefix of. This is
//! the ordering GetNext walks over.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error parsing dotted oid text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OidParseError {
    #[error("empty oid")]
    Empty,

    #[error("invalid arc {arc:?} at position {position}")]
    InvalidArc { arc: String, position: usize },
}

/// SNMP object identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Oid(Vec<u32>);

impl Oid {
    /// Create an oid from its arcs
    pub fn new(arcs: Vec<u32>) -> Self {
        Self(arcs)
    }

    /// Arcs of this oid
    pub fn arcs(&self) -> &[u32] {
        &self.0
    }

    /// Number of arcs
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the oid has no arcs
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when `self` lies in the subtree rooted at `root` (or equals it)
    pub fn starts_with(&self, root: &Oid) -> bool {
        self.0.starts_with(&root.0)
    }

    /// A new oid with `arcs` appended
    pub fn child(&self, arcs: &[u32]) -> Self {
        let mut out = Vec::with_capacity(self.0.len() + arcs.len());
        out.extend_from_slice(&self.0);
        out.extend_from_slice(arcs);
        Self(out)
    }
}

impl From<Vec<u32>> for Oid {
    fn from(arcs: Vec<u32>) -> Self {
        Self(arcs)
    }
}

impl From<&[u32]> for Oid {
    fn from(arcs: &[u32]) -> Self {
        Self(arcs.to_vec())
    }
}

impl FromStr for Oid {
    type Err = OidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let trimmed = trimmed.strip_prefix('.').unwrap_or(trimmed);
        if trimmed.is_empty() {
            return Err(OidParseError::Empty);
        }

        trimmed
            .split('.')
            .enumerate()
            .map(|(position, arc)| {
                arc.parse::<u32>().map_err(|_| OidParseError::InvalidArc {
                    arc: arc.to_string(),
                    position,
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut arcs = self.0.iter();
        if let Some(first) = arcs.next() {
            write!(f, "{}", first)?;
            for arc in arcs {
                write!(f, ".{}", arc)?;
            }
        }
        Ok(())
    }
}

// Oids travel through config and JSON as dotted text
impl Serialize for Oid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Oid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
