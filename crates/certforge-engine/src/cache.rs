//! Small injectable caches for parsed templates and other derived data.
//!
//! Callers own their cache instances; there is no process-wide cache.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Key/value cache with explicit invalidation
pub trait Cache<K, V> {
    fn get(&mut self, key: &K) -> Option<&V>;
    fn set(&mut self, key: K, value: V);
    fn has(&mut self, key: &K) -> bool;
    fn delete(&mut self, key: &K) -> Option<V>;
}

/// Source of "now" for expiry checks
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Copy, Clone, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    start: Instant,
    offset: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + self.offset.get()
    }
}

/// When entries leave a [`TtlCache`]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EvictionPolicy {
    /// Age after which an entry is dropped; `None` keeps entries forever
    pub ttl: Option<Duration>,
    /// Capacity; the oldest entry is evicted to make room
    pub max_entries: usize,
}

impl Default for EvictionPolicy {
    fn default() -> Self {
        Self {
            ttl: Some(Duration::from_secs(5 * 60)),
            max_entries: 32,
        }
    }
}

struct Entry<K, V> {
    key: K,
    value: V,
    inserted_at: Instant,
}

/// A cache whose entries expire after a fixed age.
///
/// Entries are kept in insertion order and found by linear scan, so keep
/// `max_entries` in the order of tens. Expired entries are removed when
/// they are next looked up or when room is needed.
pub struct TtlCache<K, V, C = SystemClock> {
    entries: Vec<Entry<K, V>>,
    policy: EvictionPolicy,
    clock: C,
}

impl<K: PartialEq, V> TtlCache<K, V, SystemClock> {
    pub fn new(policy: EvictionPolicy) -> Self {
        Self::with_clock(policy, SystemClock)
    }
}

impl<K: PartialEq, V, C: Clock> TtlCache<K, V, C> {
    pub fn with_clock(policy: EvictionPolicy, clock: C) -> Self {
        Self {
            entries: Vec::new(),
            policy,
            clock,
        }
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    /// Number of stored entries, including any not yet found to be expired
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn is_expired(&self, entry: &Entry<K, V>) -> bool {
        match self.policy.ttl {
            Some(ttl) => self.clock.now().duration_since(entry.inserted_at) >= ttl,
            None => false,
        }
    }

    /// Index of a live entry for `key`, dropping it first if it has expired
    fn find_live(&mut self, key: &K) -> Option<usize> {
        let index = self.entries.iter().position(|entry| &entry.key == key)?;
        if self.is_expired(&self.entries[index]) {
            self.entries.remove(index);
            return None;
        }
        Some(index)
    }

    fn make_room(&mut self) {
        let now = self.clock.now();
        if let Some(ttl) = self.policy.ttl {
            self.entries
                .retain(|entry| now.duration_since(entry.inserted_at) < ttl);
        }
        while !self.entries.is_empty() && self.entries.len() >= self.policy.max_entries {
            self.entries.remove(0);
        }
    }
}

impl<K: PartialEq, V, C: Clock> Cache<K, V> for TtlCache<K, V, C> {
    fn get(&mut self, key: &K) -> Option<&V> {
        let index = self.find_live(key)?;
        Some(&self.entries[index].value)
    }

    fn set(&mut self, key: K, value: V) {
        if self.policy.max_entries == 0 {
            return;
        }
        if let Some(index) = self.entries.iter().position(|entry| entry.key == key) {
            self.entries.remove(index);
        }
        self.make_room();
        let inserted_at = self.clock.now();
        self.entries.push(Entry {
            key,
            value,
            inserted_at,
        });
    }

    fn has(&mut self, key: &K) -> bool {
        self.find_live(key).is_some()
    }

    fn delete(&mut self, key: &K) -> Option<V> {
        let index = self.entries.iter().position(|entry| &entry.key == key)?;
        Some(self.entries.remove(index).value)
    }
}
