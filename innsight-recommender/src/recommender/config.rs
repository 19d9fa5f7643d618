//! Pipeline configuration.

use innsight_core::{DEFAULT_BUFFER, FallbackCacheConfig, ResultCacheConfig};
use innsight_data::routing::RetryPolicy;
use innsight_scorer::{RatingWeights, WeightsError};
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_INTERVALS: [u32; 3] = [15, 30, 60];
const DEFAULT_PROFILE: &str = "driving-car";
const DEFAULT_TOP_N: usize = 20;

/// Rejected pipeline configuration.
#[derive(Debug, Error)]
pub enum RecommenderConfigError {
    /// The JSON document could not be read.
    #[error("failed to parse recommender configuration")]
    Parse {
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },
    /// No isochrone intervals were given.
    #[error("at least one isochrone interval is required")]
    NoIntervals,
    /// Intervals must be positive and strictly increasing.
    #[error("isochrone intervals must be positive and strictly increasing, got {intervals:?}")]
    UnorderedIntervals {
        /// Intervals supplied.
        intervals: Vec<u32>,
    },
    /// The routing profile is blank.
    #[error("routing profile must not be empty")]
    EmptyProfile,
    /// The default scoring weights are unusable.
    #[error("invalid default weights: {source}")]
    Weights {
        /// Underlying validation failure.
        #[source]
        source: WeightsError,
    },
}

/// Settings for a [`Recommender`](super::Recommender).
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use innsight_recommender::RecommenderConfig;
///
/// let config = RecommenderConfig::from_json_str(
///     r#"{"profile": "foot-walking", "result_cache": {"ttl_secs": 60}}"#,
/// )?;
/// assert_eq!(config.profile, "foot-walking");
/// assert_eq!(config.intervals, vec![15, 30, 60]);
/// assert_eq!(config.result_cache.max_size, 20);
/// # Ok::<(), innsight_recommender::RecommenderConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    /// Isochrone travel times in minutes, shortest first.
    pub intervals: Vec<u32>,
    /// Routing profile passed to the isochrone service.
    pub profile: String,
    /// Tier classifier buffer in degrees.
    pub buffer: f64,
    /// Isochrone fallback cache limits.
    pub fallback: FallbackCacheConfig,
    /// Recommendation cache limits.
    pub result_cache: ResultCacheConfig,
    /// Isochrone retry policy.
    pub retry: RetryPolicy,
    /// Scoring weights before per-query overrides.
    pub weights: RatingWeights,
    /// Result count when a query does not specify one.
    pub default_top_n: usize,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            intervals: DEFAULT_INTERVALS.to_vec(),
            profile: DEFAULT_PROFILE.to_owned(),
            buffer: DEFAULT_BUFFER,
            fallback: FallbackCacheConfig::default(),
            result_cache: ResultCacheConfig::default(),
            retry: RetryPolicy::default(),
            weights: RatingWeights::default(),
            default_top_n: DEFAULT_TOP_N,
        }
    }
}

impl RecommenderConfig {
    /// Parse and validate a JSON configuration document.
    ///
    /// # Errors
    /// Returns [`RecommenderConfigError::Parse`] for malformed JSON and the
    /// errors of [`RecommenderConfig::validate`] otherwise.
    pub fn from_json_str(json: &str) -> Result<Self, RecommenderConfigError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|source| RecommenderConfigError::Parse { source })?;
        config.validate()
    }

    /// Set the isochrone intervals.
    #[must_use]
    pub fn with_intervals(mut self, intervals: Vec<u32>) -> Self {
        self.intervals = intervals;
        self
    }

    /// Set the routing profile.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Set the tier classifier buffer.
    #[must_use]
    pub const fn with_buffer(mut self, buffer: f64) -> Self {
        self.buffer = buffer;
        self
    }

    /// Set the isochrone fallback cache limits.
    #[must_use]
    pub fn with_fallback(mut self, fallback: FallbackCacheConfig) -> Self {
        self.fallback = fallback;
        self
    }

    /// Set the recommendation cache limits.
    #[must_use]
    pub fn with_result_cache(mut self, result_cache: ResultCacheConfig) -> Self {
        self.result_cache = result_cache;
        self
    }

    /// Set the isochrone retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the default scoring weights.
    #[must_use]
    pub const fn with_weights(mut self, weights: RatingWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Set the default result count.
    #[must_use]
    pub const fn with_default_top_n(mut self, top_n: usize) -> Self {
        self.default_top_n = top_n;
        self
    }

    /// Highest tier a classified accommodation can reach.
    #[must_use]
    pub fn max_tier(&self) -> usize {
        self.intervals.len()
    }

    /// Check the configuration is usable and return it.
    ///
    /// # Errors
    /// Returns [`RecommenderConfigError`] for missing or unordered intervals,
    /// a blank profile, or invalid weights.
    pub fn validate(self) -> Result<Self, RecommenderConfigError> {
        if self.intervals.is_empty() {
            return Err(RecommenderConfigError::NoIntervals);
        }
        let ascending = self.intervals.first().is_some_and(|&first| first > 0)
            && self.intervals.windows(2).all(|pair| matches!(pair, [a, b] if a < b));
        if !ascending {
            return Err(RecommenderConfigError::UnorderedIntervals {
                intervals: self.intervals,
            });
        }
        if self.profile.trim().is_empty() {
            return Err(RecommenderConfigError::EmptyProfile);
        }
        self.weights
            .validate()
            .map_err(|source| RecommenderConfigError::Weights { source })?;
        Ok(self)
    }
}
