//! Time-bounded caches for isochrones and finished recommendations.
//!
//! Both caches evict by insertion time rather than access time: an entry
//! read a thousand times is still the first to go once it is the oldest.
//! Time is read through a [`Clock`] so expiry can be driven by tests.

mod clock;
mod fallback;
mod result;

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

pub use clock::{Clock, SystemClock};
pub use fallback::{FallbackCache, FallbackCacheConfig, FallbackCacheInfo, FallbackEntryInfo};
pub use result::{
    CacheKey, CacheStats, RankedPayload, ResultCache, ResultCacheConfig, build_key,
};

/// Size of a cached payload, reported by cache introspection.
pub trait PayloadLen {
    /// Number of top-level items in the payload.
    fn payload_len(&self) -> usize;
}

impl<T> PayloadLen for Vec<T> {
    fn payload_len(&self) -> usize {
        self.len()
    }
}

/// A cached value stamped with the time it was stored.
#[derive(Debug, Clone)]
struct Stamped<V> {
    value: V,
    inserted_at: Duration,
}

impl<V> Stamped<V> {
    fn age(&self, now: Duration) -> Duration {
        now.saturating_sub(self.inserted_at)
    }
}

/// Drop entries older than `ttl`, then the oldest survivors until at most
/// `max_size` remain.
fn prune<K, V>(entries: &mut HashMap<K, Stamped<V>>, now: Duration, ttl: Duration, max_size: usize)
where
    K: Clone + Eq + Hash,
{
    entries.retain(|_, entry| entry.age(now) <= ttl);
    if entries.len() <= max_size {
        return;
    }

    let mut by_age: Vec<(K, Duration)> = entries
        .iter()
        .map(|(key, entry)| (key.clone(), entry.inserted_at))
        .collect();
    by_age.sort_by_key(|(_, inserted_at)| *inserted_at);
    for (key, _) in by_age {
        if entries.len() <= max_size {
            break;
        }
        entries.remove(&key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn stamped(secs: u64) -> Stamped<u8> {
        Stamped {
            value: 0,
            inserted_at: Duration::from_secs(secs),
        }
    }

    #[rstest]
    fn prune_removes_expired_before_oldest() {
        let mut entries = HashMap::from([("a", stamped(0)), ("b", stamped(50)), ("c", stamped(90))]);

        prune(&mut entries, Duration::from_secs(100), Duration::from_secs(60), 10);

        let mut keys: Vec<_> = entries.keys().copied().collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["b", "c"]);
    }

    #[rstest]
    fn prune_evicts_oldest_until_within_limit() {
        let mut entries = HashMap::from([
            ("a", stamped(30)),
            ("b", stamped(10)),
            ("c", stamped(20)),
            ("d", stamped(40)),
        ]);

        prune(&mut entries, Duration::from_secs(40), Duration::from_secs(3600), 2);

        let mut keys: Vec<_> = entries.keys().copied().collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["a", "d"]);
    }

    #[rstest]
    fn age_saturates_when_clock_goes_backwards() {
        assert_eq!(stamped(10).age(Duration::from_secs(5)), Duration::ZERO);
    }
}
