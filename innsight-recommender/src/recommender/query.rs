//! Structured recommendation requests.

use std::collections::BTreeMap;

use innsight_core::{CacheKey, build_key};
use serde::Deserialize;

/// A parsed recommendation request.
///
/// Produced by an upstream query parser; free-text parsing is not part of
/// this crate.
///
/// # Examples
/// ```
/// use innsight_recommender::RecommendationQuery;
///
/// let query = RecommendationQuery::new("Churaumi Aquarium")
///     .with_place("Okinawa")
///     .with_filter("parking")
///     .with_weight("rating", 5.0)
///     .with_top_n(5);
///
/// assert_eq!(query.search_term(), "Okinawa");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RecommendationQuery {
    /// Point of interest the stay should be near.
    pub poi: String,
    /// Wider area the POI lies in, if named.
    pub place: Option<String>,
    /// Amenity tags that must be `yes`.
    pub filters: Vec<String>,
    /// Per-query scoring weight overrides.
    pub weights: BTreeMap<String, f64>,
    /// Result count; the configured default when absent.
    pub top_n: Option<usize>,
}

impl RecommendationQuery {
    /// Query for stays near `poi`.
    #[must_use]
    pub fn new(poi: impl Into<String>) -> Self {
        Self {
            poi: poi.into(),
            ..Self::default()
        }
    }

    /// Name the wider area.
    #[must_use]
    pub fn with_place(mut self, place: impl Into<String>) -> Self {
        self.place = Some(place.into());
        self
    }

    /// Require an amenity tag to be `yes`.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filters.push(filter.into());
        self
    }

    /// Override one scoring weight.
    #[must_use]
    pub fn with_weight(mut self, key: impl Into<String>, weight: f64) -> Self {
        self.weights.insert(key.into(), weight);
        self
    }

    /// Limit the number of results.
    #[must_use]
    pub const fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = Some(top_n);
        self
    }

    /// Text to geocode: the place when one is named, otherwise the POI.
    #[must_use]
    pub fn search_term(&self) -> &str {
        self.place
            .as_deref()
            .map(str::trim)
            .filter(|place| !place.is_empty())
            .unwrap_or_else(|| self.poi.trim())
    }

    /// Report whether there is nothing to search for.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.search_term().is_empty()
    }

    /// Cache identity of this query under routing `profile`.
    #[must_use]
    pub fn cache_key(&self, profile: &str) -> CacheKey {
        build_key(
            &self.poi,
            self.place.as_deref(),
            &self.filters,
            Some(&self.weights),
            profile,
        )
    }
}
