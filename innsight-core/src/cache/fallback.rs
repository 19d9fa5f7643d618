//! Memoisation with stale fallback.
//!
//! A [`FallbackCache`] answers from fresh entries and, when the live fetch
//! fails, still hands out whatever it last stored for the key regardless of
//! age. Expired entries therefore linger until a store pushes the cache past
//! its size limit.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use serde::Deserialize;

use super::{Clock, PayloadLen, Stamped, SystemClock, prune};
use crate::config::deserialize_hours;

/// Default number of retained entries.
const DEFAULT_MAX_SIZE: usize = 128;

/// Default freshness window.
const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Limits for a [`FallbackCache`].
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use innsight_core::FallbackCacheConfig;
///
/// let config: FallbackCacheConfig =
///     serde_json::from_str(r#"{"max_size": 16, "ttl_hours": 2}"#)?;
/// assert_eq!(config.ttl, Duration::from_secs(7200));
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FallbackCacheConfig {
    /// Maximum number of entries kept after a store.
    pub max_size: usize,
    /// Age up to which an entry is served without refetching.
    #[serde(rename = "ttl_hours", deserialize_with = "deserialize_hours")]
    pub ttl: Duration,
}

impl Default for FallbackCacheConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            ttl: DEFAULT_TTL,
        }
    }
}

impl FallbackCacheConfig {
    /// Set the entry limit.
    #[must_use]
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set the freshness window.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Summary of one cached entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackEntryInfo<K> {
    /// Entry key.
    pub key: K,
    /// Size of the cached payload.
    pub payload_len: usize,
    /// Time since the entry was stored.
    pub age: Duration,
}

/// Snapshot returned by [`FallbackCache::info`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackCacheInfo<K> {
    /// Number of entries, fresh or stale.
    pub size: usize,
    /// Per-entry summaries in no particular order.
    pub entries: Vec<FallbackEntryInfo<K>>,
}

/// Keyed cache that keeps stale values as a fallback source.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use innsight_core::{FallbackCache, FallbackCacheConfig};
///
/// let mut cache = FallbackCache::new(FallbackCacheConfig::default());
/// cache.store("okinawa", vec![1, 2, 3]);
///
/// assert_eq!(cache.get_fresh(&"okinawa"), Some(vec![1, 2, 3]));
/// assert_eq!(cache.info().size, 1);
/// ```
#[derive(Debug)]
pub struct FallbackCache<K, V, C = SystemClock> {
    entries: HashMap<K, Stamped<V>>,
    config: FallbackCacheConfig,
    clock: C,
}

impl<K, V> FallbackCache<K, V, SystemClock>
where
    K: Clone + Eq + Hash,
{
    /// Create an empty cache reading wall-clock time.
    #[must_use]
    pub fn new(config: FallbackCacheConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<K, V, C> FallbackCache<K, V, C>
where
    K: Clone + Eq + Hash,
    C: Clock,
{
    /// Create an empty cache reading time from `clock`.
    #[must_use]
    pub fn with_clock(config: FallbackCacheConfig, clock: C) -> Self {
        Self {
            entries: HashMap::new(),
            config,
            clock,
        }
    }

    /// Configured limits.
    #[must_use]
    pub const fn config(&self) -> &FallbackCacheConfig {
        &self.config
    }

    /// Return the value for `key` if it is no older than the TTL.
    #[must_use]
    pub fn get_fresh(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        let now = self.clock.now();
        self.entries
            .get(key)
            .filter(|entry| entry.age(now) <= self.config.ttl)
            .map(|entry| entry.value.clone())
    }

    /// Return the value for `key` and its age, however old.
    #[must_use]
    pub fn get_any(&self, key: &K) -> Option<(V, Duration)>
    where
        V: Clone,
    {
        let now = self.clock.now();
        self.entries
            .get(key)
            .map(|entry| (entry.value.clone(), entry.age(now)))
    }

    /// Store `value` under `key`, then evict if over the limit.
    ///
    /// Expired entries stay as fallback material while the cache is within
    /// `max_size`. Once a store pushes it over, expired entries are swept
    /// first and then the oldest go until it fits. A limit of zero keeps
    /// nothing.
    pub fn store(&mut self, key: K, value: V) {
        let now = self.clock.now();
        self.entries.insert(
            key,
            Stamped {
                value,
                inserted_at: now,
            },
        );
        if self.entries.len() > self.config.max_size {
            prune(&mut self.entries, now, self.config.ttl, self.config.max_size);
        }
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of entries, fresh or stale.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Report whether the cache holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Describe the current contents.
    #[must_use]
    pub fn info(&self) -> FallbackCacheInfo<K>
    where
        V: PayloadLen,
    {
        let now = self.clock.now();
        FallbackCacheInfo {
            size: self.entries.len(),
            entries: self
                .entries
                .iter()
                .map(|(key, entry)| FallbackEntryInfo {
                    key: key.clone(),
                    payload_len: entry.value.payload_len(),
                    age: entry.age(now),
                })
                .collect(),
        }
    }
}
