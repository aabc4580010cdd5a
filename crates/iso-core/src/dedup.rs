//! Query-scoped visited set for frontier searches.

use std::collections::HashSet;
use std::hash::{BuildHasher, Hash};

use siphasher::sip::SipHasher13;

use crate::errors::{ErrorInfo, IsoError};

/// Hasher factory using SipHash-1-3 with fixed zero keys.
///
/// Fixed keys keep memory layout and probe sequences identical from run to
/// run, so a capped search fails at the same point every time.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedSipState;

impl BuildHasher for FixedSipState {
    type Hasher = SipHasher13;

    fn build_hasher(&self) -> Self::Hasher {
        SipHasher13::new_with_keys(0, 0)
    }
}

/// Insert-only set with an optional hard cap on its size.
#[derive(Debug, Clone)]
pub struct DedupIndex<K> {
    seen: HashSet<K, FixedSipState>,
    cap: Option<usize>,
}

impl<K: Hash + Eq> DedupIndex<K> {
    /// Creates an index with a capacity hint and an optional entry cap.
    pub fn new(capacity_hint: usize, cap: Option<usize>) -> Self {
        let capacity = match cap {
            Some(limit) => capacity_hint.min(limit),
            None => capacity_hint,
        };
        Self {
            seen: HashSet::with_capacity_and_hasher(capacity, FixedSipState),
            cap,
        }
    }

    /// Inserts `key` if absent. Returns `Ok(true)` when it was new.
    ///
    /// Fails with `ResourceExhausted` when a new key would push the index past
    /// its cap; existing keys are always answered.
    pub fn insert(&mut self, key: K) -> Result<bool, IsoError> {
        if self.seen.contains(&key) {
            return Ok(false);
        }
        if let Some(limit) = self.cap {
            if self.seen.len() >= limit {
                return Err(IsoError::ResourceExhausted(
                    ErrorInfo::new("state-cap", "visited-state index reached its cap")
                        .with_context("limit", limit)
                        .with_hint("raise limits.max_states or lower the stop condition"),
                ));
            }
        }
        Ok(self.seen.insert(key))
    }

    /// Returns true if `key` has been inserted.
    pub fn contains(&self, key: &K) -> bool {
        self.seen.contains(key)
    }

    /// Number of distinct keys held.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Returns true when nothing was inserted yet.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
