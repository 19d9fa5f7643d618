//! Errors surfaced by the recommendation pipeline.

use innsight_core::{GeocodeError, IsochroneError, ScoreError, SearchError, TierError};
use innsight_scorer::WeightsError;
use thiserror::Error;

/// Failure of [`Recommender::recommend`](super::Recommender::recommend).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecommendError {
    /// The search term could not be located.
    #[error("geocoding failed: {source}")]
    Geocode {
        /// Failure reported by the geocoder.
        #[from]
        source: GeocodeError,
    },
    /// Accommodations could not be fetched.
    #[error("accommodation search failed: {source}")]
    Search {
        /// Failure reported by the accommodation source.
        #[from]
        source: SearchError,
    },
    /// Isochrones were unavailable even from the fallback cache.
    #[error("external service unavailable: {source}")]
    ServiceUnavailable {
        /// Failure reported by the isochrone source.
        #[from]
        source: IsochroneError,
    },
    /// Accommodations could not be tiered.
    #[error("tier assignment failed: {source}")]
    Tier {
        /// Failure reported by the classifier.
        #[from]
        source: TierError,
    },
    /// An accommodation could not be scored.
    #[error("scoring failed: {source}")]
    Scoring {
        /// Failure reported by the scorer.
        #[from]
        source: ScoreError,
    },
    /// The query's weights cannot be used.
    #[error("invalid weights: {source}")]
    InvalidWeights {
        /// Validation failure.
        #[from]
        source: WeightsError,
    },
    /// Filtering left nothing to recommend.
    #[error("no accommodations match the specified filters: {filters:?}")]
    NoAccommodation {
        /// Filters that were applied.
        filters: Vec<String>,
    },
}
