//! Cache of finished recommendations keyed by query signature.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};

use super::{Clock, Stamped, SystemClock, prune};
use crate::config::deserialize_secs;

const DEFAULT_MAX_SIZE: usize = 20;
const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);
const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Bytes of digest kept in a [`CacheKey`].
const KEY_BYTES: usize = 16;

/// Characters of a key shown in hit logs.
const LOG_PREFIX_CHARS: usize = 8;

/// Limits for a [`ResultCache`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResultCacheConfig {
    /// Maximum number of entries kept after a cleanup.
    pub max_size: usize,
    /// Age after which an entry is a miss.
    #[serde(rename = "ttl_secs", deserialize_with = "deserialize_secs")]
    pub ttl: Duration,
    /// Minimum spacing between cleanup passes. Zero disables throttling.
    #[serde(rename = "cleanup_interval_secs", deserialize_with = "deserialize_secs")]
    pub cleanup_interval: Duration,
}

impl Default for ResultCacheConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            ttl: DEFAULT_TTL,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }
}

impl ResultCacheConfig {
    /// Set the entry limit.
    #[must_use]
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set the entry lifetime.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the cleanup throttle.
    #[must_use]
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }
}

/// A payload whose ranked list can be cut to the first `n` entries.
pub trait RankedPayload: Clone {
    /// Keep only the first `top_n` ranked items.
    fn truncate_ranked(&mut self, top_n: usize);
}

/// Stable 128-bit identity of a recommendation query, as 32 hex digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Hex representation of the key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading characters of the key for log lines.
    #[must_use]
    pub fn prefix(&self) -> String {
        self.0.chars().take(LOG_PREFIX_CHARS).collect()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the cache key for a recommendation query.
///
/// Filters are order-insensitive and weights are keyed by name. An absent place equals an
/// empty one, and absent weights equal an empty map.
///
/// # Examples
/// ```
/// use innsight_core::build_key;
///
/// let a = build_key("Shuri Castle", None, &["b".into(), "a".into()], None, "driving-car");
/// let b = build_key("Shuri Castle", Some(""), &["a".into(), "b".into()], None, "driving-car");
/// assert_eq!(a, b);
/// assert_eq!(a.as_str().len(), 32);
/// ```
#[must_use]
pub fn build_key(
    poi: &str,
    place: Option<&str>,
    filters: &[String],
    weights: Option<&BTreeMap<String, f64>>,
    profile: &str,
) -> CacheKey {
    let mut sorted_filters: Vec<&str> = filters.iter().map(String::as_str).collect();
    sorted_filters.sort_unstable();
    let weight_items: Option<Vec<(&str, f64)>> = weights
        .filter(|map| !map.is_empty())
        .map(|map| map.iter().map(|(key, weight)| (key.as_str(), *weight)).collect());

    let canonical = json!([
        poi,
        place.unwrap_or_default(),
        sorted_filters,
        weight_items,
        profile
    ]);
    let digest = Sha256::digest(canonical.to_string().as_bytes());
    CacheKey(
        digest
            .iter()
            .take(KEY_BYTES)
            .map(|byte| format!("{byte:02x}"))
            .collect(),
    )
}

/// Counters and occupancy of a [`ResultCache`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that found nothing usable.
    pub misses: u64,
    /// `hits / (hits + misses)`, or `0.0` before any lookup.
    pub hit_rate: f64,
    /// `hits + misses`.
    pub total_requests: u64,
    /// Queries the external parser failed to understand.
    pub parsing_failures: u64,
    /// Entries currently held.
    pub size: usize,
    /// Configured entry limit.
    pub max_size: usize,
}

/// TTL and size bounded cache of ranked recommendation payloads.
///
/// Stored payloads are private copies. Reads hand back a fresh copy cut to
/// the requested length while the full ranked list stays cached.
///
/// # Examples
/// ```
/// use innsight_core::{RankedPayload, ResultCache, ResultCacheConfig, build_key};
///
/// #[derive(Clone)]
/// struct Ranked(Vec<u32>);
///
/// impl RankedPayload for Ranked {
///     fn truncate_ranked(&mut self, top_n: usize) {
///         self.0.truncate(top_n);
///     }
/// }
///
/// let mut cache = ResultCache::new(ResultCacheConfig::default());
/// let key = build_key("Naha Airport", None, &[], None, "driving-car");
/// cache.put(key.clone(), &Ranked(vec![9, 8, 7]));
///
/// let hit = cache.get(&key, Some(2)).expect("fresh entry");
/// assert_eq!(hit.0, vec![9, 8]);
/// assert_eq!(cache.stats().hits, 1);
/// ```
#[derive(Debug)]
pub struct ResultCache<V, C = SystemClock> {
    entries: HashMap<CacheKey, Stamped<V>>,
    config: ResultCacheConfig,
    clock: C,
    hits: u64,
    misses: u64,
    parsing_failures: u64,
    last_cleanup: Option<Duration>,
}

impl<V: RankedPayload> ResultCache<V, SystemClock> {
    /// Create an empty cache reading wall-clock time.
    #[must_use]
    pub fn new(config: ResultCacheConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<V: RankedPayload, C: Clock> ResultCache<V, C> {
    /// Create an empty cache reading time from `clock`.
    #[must_use]
    pub fn with_clock(config: ResultCacheConfig, clock: C) -> Self {
        Self {
            entries: HashMap::new(),
            config,
            clock,
            hits: 0,
            misses: 0,
            parsing_failures: 0,
            last_cleanup: None,
        }
    }

    /// Configured limits.
    #[must_use]
    pub const fn config(&self) -> &ResultCacheConfig {
        &self.config
    }

    /// Look up `key`, returning a copy truncated to `top_n` items.
    ///
    /// A throttled cleanup runs first. Expired entries are removed and
    /// count as misses.
    pub fn get(&mut self, key: &CacheKey, top_n: Option<usize>) -> Option<V> {
        self.cleanup();
        let now = self.clock.now();
        let Some(entry) = self.entries.get(key) else {
            self.misses += 1;
            return None;
        };
        if entry.age(now) > self.config.ttl {
            self.entries.remove(key);
            self.misses += 1;
            return None;
        }

        self.hits += 1;
        log::debug!("Cache hit for key {}", key.prefix());
        let mut payload = entry.value.clone();
        if let Some(top_n) = top_n {
            payload.truncate_ranked(top_n);
        }
        Some(payload)
    }

    /// Store a private copy of `payload` under `key`, then clean up.
    pub fn put(&mut self, key: CacheKey, payload: &V) {
        let inserted_at = self.clock.now();
        self.entries.insert(
            key,
            Stamped {
                value: payload.clone(),
                inserted_at,
            },
        );
        self.cleanup();
    }

    /// Sweep expired and excess entries unless a sweep ran recently.
    ///
    /// Returns the post-sweep statistics when the sweep ran and `None` when
    /// it was throttled.
    pub fn cleanup(&mut self) -> Option<CacheStats> {
        let now = self.clock.now();
        if let Some(last) = self.last_cleanup
            && now.saturating_sub(last) < self.config.cleanup_interval
        {
            return None;
        }
        self.last_cleanup = Some(now);

        prune(&mut self.entries, now, self.config.ttl, self.config.max_size);
        let stats = self.stats();
        log::info!(
            "Cache stats - Size: {}/{}, Hits: {}, Misses: {}, Hit rate: {:.1}%, Parsing failures: {}",
            stats.size,
            stats.max_size,
            stats.hits,
            stats.misses,
            percent(stats.hit_rate),
            stats.parsing_failures,
        );
        Some(stats)
    }

    /// Count a query the external parser could not understand.
    pub fn record_parsing_failure(&mut self) {
        self.parsing_failures += 1;
    }

    /// Current counters and occupancy. Never mutates the cache.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let total_requests = self.hits + self.misses;
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            hit_rate: ratio(self.hits, total_requests),
            total_requests,
            parsing_failures: self.parsing_failures,
            size: self.entries.len(),
            max_size: self.config.max_size,
        }
    }

    /// Drop every entry, keeping the counters.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of entries currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Report whether the cache holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "hit rate is a ratio of request counters"
)]
fn ratio(hits: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

#[expect(clippy::float_arithmetic, reason = "hit rate is logged as a percentage")]
fn percent(rate: f64) -> f64 {
    rate * 100.0
}
