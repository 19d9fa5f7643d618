//! Facade crate for the Innsight accommodation recommender.
//!
//! This crate re-exports the public API of the member crates: domain types
//! and caches from `innsight-core`, the routing client from `innsight-data`,
//! scoring from `innsight-scorer` and the pipeline from
//! `innsight-recommender`.

#![forbid(unsafe_code)]

pub use innsight_core::{
    Accommodation, AccommodationScorer, AccommodationSource, CacheKey, CacheStats, Clock,
    FallbackCache, FallbackCacheConfig, FetchError, FetchErrorKind, GeocodeError, Geocoder,
    IsochroneError, IsochroneProvider, IsochroneRequest, IsochroneSet, IsochroneSource,
    ResultCache, ResultCacheConfig, ScoreError, SearchError, SystemClock, TierClassifier,
    TierError, Tiered, assign_tiers, build_key,
};
pub use innsight_data::routing::{
    CachedIsochroneProvider, OrsConfig, OrsIsochroneProvider, RetryPolicy,
    RetryingIsochroneProvider,
};
pub use innsight_recommender::{
    OrsIsochroneSource, RecommendError, Recommendation, RecommendationQuery, Recommender,
    RecommenderConfig, ors_isochrone_source,
};
pub use innsight_scorer::{RatingScorer, RatingWeights};
