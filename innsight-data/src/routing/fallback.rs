//! Memoised isochrone fetching with stale fallback.

use std::sync::{Mutex, MutexGuard, PoisonError};

use innsight_core::{
    Clock, FallbackCache, FallbackCacheConfig, FallbackCacheInfo, IsochroneCacheKey,
    IsochroneError, IsochroneProvider, IsochroneRequest, IsochroneSet, IsochroneSource,
    SystemClock,
};

const SECS_PER_HOUR: f64 = 3600.0;

/// `IsochroneSource` answering from a [`FallbackCache`] before the network.
///
/// Fresh entries short-circuit the wrapped provider. On a fetch failure any
/// entry for the request, however old, is returned with a warning. Explicit
/// API rejections are never masked.
///
/// The cache lock is released while fetching, so concurrent misses for the
/// same request may both reach the provider; the last store wins.
///
/// # Examples
/// ```
/// use geo::{Coord, polygon};
/// use innsight_core::test_support::ScriptedIsochroneProvider;
/// use innsight_core::{FallbackCacheConfig, IsochroneRequest, IsochroneSet, IsochroneSource};
/// use innsight_data::routing::CachedIsochroneProvider;
///
/// let square = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)];
/// let inner = ScriptedIsochroneProvider::always(IsochroneSet::new(vec![square]));
/// let source = CachedIsochroneProvider::new(inner, FallbackCacheConfig::default());
///
/// let request = IsochroneRequest::from_minutes("driving-car", Coord { x: 0.0, y: 0.0 }, &[15]);
/// source.isochrones(&request)?;
/// source.isochrones(&request)?;
/// assert_eq!(source.inner().calls(), 1);
/// # Ok::<(), innsight_core::IsochroneError>(())
/// ```
#[derive(Debug)]
pub struct CachedIsochroneProvider<P, C = SystemClock> {
    inner: P,
    cache: Mutex<FallbackCache<IsochroneCacheKey, IsochroneSet, C>>,
}

impl<P: IsochroneProvider> CachedIsochroneProvider<P, SystemClock> {
    /// Wrap `inner` with a cache reading wall-clock time.
    #[must_use]
    pub fn new(inner: P, config: FallbackCacheConfig) -> Self {
        Self::with_clock(inner, config, SystemClock)
    }
}

impl<P: IsochroneProvider, C: Clock> CachedIsochroneProvider<P, C> {
    /// Wrap `inner` with a cache reading time from `clock`.
    #[must_use]
    pub fn with_clock(inner: P, config: FallbackCacheConfig, clock: C) -> Self {
        Self {
            inner,
            cache: Mutex::new(FallbackCache::with_clock(config, clock)),
        }
    }

    /// Borrow the wrapped provider.
    #[must_use]
    pub const fn inner(&self) -> &P {
        &self.inner
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Describe the cached entries.
    #[must_use]
    pub fn info(&self) -> FallbackCacheInfo<IsochroneCacheKey> {
        self.lock().info()
    }

    fn lock(&self) -> MutexGuard<'_, FallbackCache<IsochroneCacheKey, IsochroneSet, C>> {
        // Entries are replaced whole, so a panic mid-update leaves no torn state.
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P: IsochroneProvider, C: Clock> IsochroneSource for CachedIsochroneProvider<P, C> {
    fn isochrones(&self, request: &IsochroneRequest) -> Result<IsochroneSet, IsochroneError> {
        let key = request.cache_key();
        if let Some(fresh) = self.lock().get_fresh(&key) {
            return Ok(fresh);
        }

        match self.inner.fetch_isochrones(request) {
            Ok(set) => {
                self.lock().store(key, set.clone());
                Ok(set)
            }
            Err(source) if !source.permits_fallback() => Err(IsochroneError::Rejected { source }),
            Err(source) => {
                let Some((stale, age)) = self.lock().get_any(&key) else {
                    return Err(IsochroneError::Unavailable { source });
                };
                log::warn!(
                    "Isochrone fetch failed, serving cached result from {:.1} hours ago: {source}",
                    hours(age.as_secs_f64())
                );
                Ok(stale)
            }
        }
    }
}

#[expect(clippy::float_arithmetic, reason = "age is reported in fractional hours")]
fn hours(secs: f64) -> f64 {
    secs / SECS_PER_HOUR
}
