//! Core domain types for the Innsight recommendation engine.
//!
//! The crate holds everything that does not touch the network: the
//! accommodation and isochrone models, the collaborator traits implemented
//! by HTTP clients elsewhere, the proximity [`TierClassifier`], and the two
//! caches that keep repeated queries away from the routing service.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod accommodation;
pub mod cache;
pub mod config;
mod isochrone;
mod scorer;
mod search;
mod tier;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use accommodation::{Accommodation, Locatable};
pub use cache::{
    CacheKey, CacheStats, Clock, FallbackCache, FallbackCacheConfig, FallbackCacheInfo,
    FallbackEntryInfo, PayloadLen, RankedPayload, ResultCache, ResultCacheConfig, SystemClock,
    build_key,
};
pub use isochrone::{
    FETCH_OPERATION, FetchError, FetchErrorKind, IsochroneCacheKey, IsochroneError,
    IsochroneProvider, IsochroneRequest, IsochroneSet, IsochroneSource,
};
pub use scorer::{AccommodationScorer, ScoreError};
pub use search::{AccommodationSource, GeocodeError, Geocoder, SearchError};
pub use tier::{DEFAULT_BUFFER, MissingCoordinate, TierClassifier, TierError, Tiered, assign_tiers};
