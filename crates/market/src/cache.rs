//! Bounded TTL cache for ticker snapshots.

use dashmap::DashMap;
use std::time::{Duration, Instant};
use tickerbot_core::{Pair, TickerSnapshot};

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    snapshot: TickerSnapshot,
    inserted_at: Instant,
}

/// Concurrent pair -> snapshot cache. Entries expire after `ttl` and the
/// map never grows past `capacity`: inserting into a full cache evicts the
/// oldest-inserted entry.
pub struct TickerCache {
    entries: DashMap<Pair, CacheEntry>,
    ttl: Duration,
    capacity: usize,
}

impl TickerCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            capacity,
        }
    }

    /// Fresh snapshot for the pair, or `None`. An expired entry counts as
    /// absent and is dropped so the map does not accumulate dead pairs.
    pub fn get(&self, pair: &Pair) -> Option<TickerSnapshot> {
        let expired = match self.entries.get(pair) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                return Some(entry.snapshot);
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove(pair);
        }
        None
    }

    /// Store a snapshot, resetting the pair's age. Last writer wins when
    /// concurrent fetches race on the same pair.
    pub fn insert(&self, pair: Pair, snapshot: TickerSnapshot) {
        if !self.entries.contains_key(&pair) && self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| entry.value().inserted_at)
                .map(|entry| entry.key().clone());
            if let Some(key) = oldest {
                self.entries.remove(&key);
            }
        }

        self.entries.insert(
            pair,
            CacheEntry {
                snapshot,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
