//! The recommendation pipeline.
//!
//! [`Recommender::recommend`] answers a [`RecommendationQuery`] by:
//!
//! 1. returning a cached payload for an identical query while it is fresh;
//! 2. geocoding the search term;
//! 3. fetching nearby accommodations;
//! 4. fetching isochrones for each interval around the geocoded centre;
//! 5. assigning every accommodation a tier;
//! 6. filtering, scoring and ranking;
//! 7. caching the full payload and returning it cut to `top_n`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use innsight_core::{
    AccommodationSource, CacheStats, Clock, Geocoder, IsochroneRequest, IsochroneSource,
    ResultCache, SystemClock, TierClassifier,
};
use innsight_data::routing::{
    CachedIsochroneProvider, OrsConfig, OrsIsochroneProvider, ProviderBuildError,
    RetryingIsochroneProvider,
};
use innsight_scorer::RatingScorer;

mod config;
mod error;
mod payload;
mod query;
mod rank;

pub use config::{RecommenderConfig, RecommenderConfigError};
pub use error::RecommendError;
pub use payload::{IntervalInfo, MainPoi, RankedAccommodation, Recommendation, UNKNOWN_NAME};
pub use query::RecommendationQuery;

use payload::tier_stats;

/// Isochrone source used in production: OpenRouteService with retries and a
/// stale fallback cache.
pub type OrsIsochroneSource =
    CachedIsochroneProvider<RetryingIsochroneProvider<OrsIsochroneProvider>>;

/// Build the production isochrone stack from `ors` and the retry and
/// fallback settings in `config`.
///
/// # Errors
/// Returns [`ProviderBuildError`] when the routing configuration is invalid
/// or the HTTP client cannot be built.
pub fn ors_isochrone_source(
    ors: OrsConfig,
    config: &RecommenderConfig,
) -> Result<OrsIsochroneSource, ProviderBuildError> {
    let http = OrsIsochroneProvider::with_config(ors)?;
    let retrying = RetryingIsochroneProvider::new(http, config.retry.clone());
    Ok(CachedIsochroneProvider::new(retrying, config.fallback.clone()))
}

/// Accommodation recommender with an in-memory result cache.
///
/// Collaborators are injected so the pipeline can run against real services
/// or stubs. The result cache lock is released while collaborators run, so
/// two identical concurrent queries may both compute; the later store wins.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use innsight_core::Accommodation;
/// use innsight_core::test_support::{StubAccommodationSource, StubGeocoder, StubIsochroneSource};
/// use innsight_data::routing::test_support::square_isochrones;
/// use innsight_recommender::{RecommendationQuery, Recommender, RecommenderConfig};
///
/// let centre = Coord { x: 127.7, y: 26.2 };
/// let recommender = Recommender::new(
///     StubGeocoder::with_location(centre),
///     StubAccommodationSource::with_rows(vec![
///         Accommodation::at(1, 26.2, 127.7).with_name("Harbour Inn"),
///         Accommodation::at(2, 26.5, 127.9).with_name("Hill Lodge"),
///     ]),
///     StubIsochroneSource::with_set(square_isochrones(centre, &[0.1, 0.2, 0.4])),
///     RecommenderConfig::default(),
/// )?;
///
/// let result = recommender.recommend(&RecommendationQuery::new("Naha Port"))?;
/// assert_eq!(result.top.first().map(|row| row.name.as_str()), Some("Harbour Inn"));
/// assert_eq!(result.tier_count(3), 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Recommender<G, S, I, C = SystemClock> {
    geocoder: G,
    accommodations: S,
    isochrones: I,
    classifier: TierClassifier,
    config: RecommenderConfig,
    cache: Mutex<ResultCache<Recommendation, C>>,
}

impl<G, S, I> Recommender<G, S, I, SystemClock>
where
    G: Geocoder,
    S: AccommodationSource,
    I: IsochroneSource,
{
    /// Build a recommender whose cache reads wall-clock time.
    ///
    /// # Errors
    /// Returns [`RecommenderConfigError`] when `config` fails validation.
    pub fn new(
        geocoder: G,
        accommodations: S,
        isochrones: I,
        config: RecommenderConfig,
    ) -> Result<Self, RecommenderConfigError> {
        Self::with_clock(geocoder, accommodations, isochrones, config, SystemClock)
    }
}

impl<G, S, I, C> Recommender<G, S, I, C>
where
    G: Geocoder,
    S: AccommodationSource,
    I: IsochroneSource,
    C: Clock,
{
    /// Build a recommender whose cache reads time from `clock`.
    ///
    /// # Errors
    /// Returns [`RecommenderConfigError`] when `config` fails validation.
    pub fn with_clock(
        geocoder: G,
        accommodations: S,
        isochrones: I,
        config: RecommenderConfig,
        clock: C,
    ) -> Result<Self, RecommenderConfigError> {
        let validated = config.validate()?;
        Ok(Self {
            geocoder,
            accommodations,
            isochrones,
            classifier: TierClassifier::new(validated.buffer),
            cache: Mutex::new(ResultCache::with_clock(
                validated.result_cache.clone(),
                clock,
            )),
            config: validated,
        })
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// Borrow the isochrone source, e.g. to inspect its fallback cache.
    #[must_use]
    pub const fn isochrones(&self) -> &I {
        &self.isochrones
    }

    /// Recommend accommodations for `query`.
    ///
    /// A blank query yields an empty recommendation without contacting any
    /// service. A search that finds no accommodations yields an empty
    /// recommendation that is cached like any other.
    ///
    /// # Errors
    /// Returns [`RecommendError`] when a collaborator fails, the query's
    /// weights are invalid, or filters leave nothing to recommend.
    pub fn recommend(&self, query: &RecommendationQuery) -> Result<Recommendation, RecommendError> {
        let intervals = IntervalInfo::minutes(&self.config.intervals, &self.config.profile);
        if query.is_blank() {
            return Ok(Recommendation::empty(
                MainPoi::new("", geo::Coord { x: 0.0, y: 0.0 }),
                intervals,
            ));
        }

        let top_n = query.top_n.unwrap_or(self.config.default_top_n);
        let key = query.cache_key(&self.config.profile);
        if let Some(hit) = self.lock().get(&key, Some(top_n)) {
            return Ok(hit);
        }

        let scorer = RatingScorer::new(self.config.weights.with_overrides(&query.weights))?;
        let term = query.search_term();
        let centre = self.geocoder.geocode(term)?;
        let main_poi = MainPoi::new(term, centre);

        let rows = self.accommodations.search(centre)?;
        if rows.is_empty() {
            log::info!("No accommodations found near {term}");
            let empty = Recommendation::empty(main_poi, intervals);
            self.lock().put(key, &empty);
            return Ok(empty);
        }

        let request =
            IsochroneRequest::from_minutes(&self.config.profile, centre, &self.config.intervals);
        let isochrones = self.isochrones.isochrones(&request)?;
        let tiered = self.classifier.classify(rows, &isochrones.layers())?;

        let max_tier = self.config.max_tier();
        let ranked = rank::rank(tiered, &scorer, max_tier, &query.filters)?;
        let mut payload = Recommendation {
            stats: tier_stats(&ranked, max_tier),
            top: ranked,
            main_poi,
            isochrone_geometry: isochrones.outer_rings(),
            intervals,
        };
        log::debug!(
            "Ranked {} accommodations near {term} for key {}",
            payload.top.len(),
            key.prefix()
        );

        self.lock().put(key, &payload);
        payload.top.truncate(top_n);
        Ok(payload)
    }

    /// Current result cache counters, without side effects.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.lock().stats()
    }

    /// Count a query the external parser could not understand.
    pub fn record_parsing_failure(&self) {
        self.lock().record_parsing_failure();
    }

    /// Drop every cached recommendation.
    pub fn clear_cache(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, ResultCache<Recommendation, C>> {
        // Entries are replaced whole, so a panic mid-update leaves no torn state.
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
