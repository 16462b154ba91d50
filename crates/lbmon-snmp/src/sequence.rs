//! Request id sequence
//!
//! One sequence is shared by every walk that talks to the same agent so that a
//! late response to an abandoned request can never be mistaken for the answer
//! to a newer one. Share it with `Arc`; it is the only synchronized state in
//! the poller.

use lbmon_common::{Result, SnmpError, DEFAULT_REQUEST_ID_MAX};
use std::sync::atomic::{AtomicU32, Ordering};

/// Monotonic request id counter that wraps to zero at `max`
#[derive(Debug)]
pub struct RequestSequence {
    current: AtomicU32,
    max: u32,
}

impl RequestSequence {
    /// Sequence wrapping at `i32::MAX`, the largest id SNMPv1 can carry
    pub fn new() -> Self {
        Self {
            current: AtomicU32::new(0),
            max: DEFAULT_REQUEST_ID_MAX,
        }
    }

    /// Sequence wrapping at a custom maximum
    pub fn with_max(max: u32) -> Result<Self> {
        if max == 0 || max > DEFAULT_REQUEST_ID_MAX {
            return Err(SnmpError::Config(format!(
                "request id maximum must be in 1..={}, got {}",
                DEFAULT_REQUEST_ID_MAX, max
            )));
        }
        Ok(Self {
            current: AtomicU32::new(0),
            max,
        })
    }

    /// Advance and return the new id
    pub fn next_id(&self) -> i32 {
        let max = self.max;
        let previous = self
            .current
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |cur| {
                Some((cur + 1) % max)
            })
            .unwrap_or_else(|cur| cur);
        // current < max <= i32::MAX, so neither the add nor the cast overflows
        ((previous + 1) % max) as i32
    }

    /// Last id handed out
    pub fn current(&self) -> i32 {
        self.current.load(Ordering::Acquire) as i32
    }

    /// Rewind to `value` (taken modulo `max`). Meant for test isolation.
    pub fn reset(&self, value: u32) {
        self.current.store(value % self.max, Ordering::Release);
    }
}

impl Default for RequestSequence {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_increments_from_zero() {
        let seq = RequestSequence::new();
        assert_eq!(seq.current(), 0);
        assert_eq!(seq.next_id(), 1);
        assert_eq!(seq.next_id(), 2);
        assert_eq!(seq.current(), 2);
    }

    #[test]
    fn test_wraps_to_zero() {
        let seq = RequestSequence::with_max(3).unwrap();
        let ids: Vec<i32> = (0..7).map(|_| seq.next_id()).collect();
        assert_eq!(ids, vec![1, 2, 0, 1, 2, 0, 1]);
    }

    #[test]
    fn test_default_max_wraps_without_going_negative() {
        let seq = RequestSequence::new();
        seq.reset(DEFAULT_REQUEST_ID_MAX - 1);
        assert_eq!(seq.current(), i32::MAX - 1);
        assert_eq!(seq.next_id(), 0);
        assert_eq!(seq.next_id(), 1);
    }

    #[test]
    fn test_reset() {
        let seq = RequestSequence::with_max(100).unwrap();
        seq.next_id();
        seq.next_id();
        seq.reset(0);
        assert_eq!(seq.next_id(), 1);
        seq.reset(250);
        assert_eq!(seq.current(), 50);
    }

    #[test]
    fn test_rejects_bad_max() {
        assert!(RequestSequence::with_max(0).is_err());
        assert!(RequestSequence::with_max(u32::MAX).is_err());
    }

    #[tokio::test]
    async fn test_concurrent_ids_are_unique() {
        let seq = Arc::new(RequestSequence::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let seq = seq.clone();
            handles.push(tokio::spawn(async move {
                (0..500).map(|_| seq.next_id()).collect::<Vec<_>>()
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.await.unwrap() {
                assert!(seen.insert(id), "duplicate id {}", id);
            }
        }
        assert_eq!(seen.len(), 4000);
        assert_eq!(seq.current(), 4000);
    }

    proptest! {
        #[test]
        fn prop_ids_stay_in_range(max in 1u32..1000, steps in 0usize..3000) {
            let seq = RequestSequence::with_max(max).unwrap();
            for _ in 0..steps {
                let id = seq.next_id();
                prop_assert!(id >= 0);
                prop_assert!((id as u32) < max);
            }
            prop_assert_eq!(seq.current() as usize, steps % max as usize);
        }
    }
}
