//! Serializable recommendation payload.

use std::collections::BTreeMap;

use geo::Coord;
use innsight_core::RankedPayload;
use serde::Serialize;

/// Name used for accommodations without one.
pub const UNKNOWN_NAME: &str = "Unknown";

const INTERVAL_UNIT: &str = "minutes";

/// One ranked accommodation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedAccommodation {
    /// OpenStreetMap element id.
    pub osm_id: u64,
    /// Display name, or [`UNKNOWN_NAME`].
    pub name: String,
    /// Weighted score on a `0..=100` scale.
    pub score: f64,
    /// Proximity tier in `0..=N`.
    pub tier: usize,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Every OSM tag of the accommodation.
    pub amenities: BTreeMap<String, String>,
}

/// The point of interest the recommendation is centred on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MainPoi {
    /// Term that was geocoded.
    pub name: String,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl MainPoi {
    /// Describe `name` geocoded to `centre` (`x = lon`, `y = lat`).
    #[must_use]
    pub fn new(name: impl Into<String>, centre: Coord<f64>) -> Self {
        Self {
            name: name.into(),
            lat: centre.y,
            lon: centre.x,
        }
    }
}

/// Travel-time intervals used for tiering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntervalInfo {
    /// Intervals, shortest first.
    pub values: Vec<u32>,
    /// Unit of `values`; always `minutes`.
    pub unit: String,
    /// Routing profile.
    pub profile: String,
}

impl IntervalInfo {
    /// Describe `values` minutes travelled with `profile`.
    #[must_use]
    pub fn minutes(values: &[u32], profile: &str) -> Self {
        Self {
            values: values.to_vec(),
            unit: INTERVAL_UNIT.to_owned(),
            profile: profile.to_owned(),
        }
    }
}

/// Full result of a recommendation query.
///
/// `stats` counts every ranked accommodation per tier, under keys
/// `tier_0..=tier_N`, even when `top` has been cut short.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    /// Accommodation count per tier.
    pub stats: BTreeMap<String, usize>,
    /// Accommodations, best first.
    pub top: Vec<RankedAccommodation>,
    /// Centre of the search.
    pub main_poi: MainPoi,
    /// Outer ring of each isochrone as `[lon, lat]` pairs, shortest first.
    pub isochrone_geometry: Vec<Vec<[f64; 2]>>,
    /// Intervals used for tiering.
    pub intervals: IntervalInfo,
}

impl Recommendation {
    /// A result with nothing ranked and every tier count at zero.
    #[must_use]
    pub fn empty(main_poi: MainPoi, intervals: IntervalInfo) -> Self {
        let max_tier = intervals.values.len();
        Self {
            stats: tier_stats(&[], max_tier),
            top: Vec::new(),
            main_poi,
            isochrone_geometry: Vec::new(),
            intervals,
        }
    }

    /// Accommodation count in `tier`.
    #[must_use]
    pub fn tier_count(&self, tier: usize) -> usize {
        self.stats.get(&tier_key(tier)).copied().unwrap_or_default()
    }
}

impl RankedPayload for Recommendation {
    fn truncate_ranked(&mut self, top_n: usize) {
        self.top.truncate(top_n);
    }
}

/// Count `ranked` per tier for tiers `0..=max_tier`.
pub(crate) fn tier_stats(ranked: &[RankedAccommodation], max_tier: usize) -> BTreeMap<String, usize> {
    let mut counts = vec![0_usize; max_tier.saturating_add(1)];
    for item in ranked {
        if let Some(count) = counts.get_mut(item.tier) {
            *count += 1;
        }
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(tier, count)| (tier_key(tier), count))
        .collect()
}

fn tier_key(tier: usize) -> String {
    format!("tier_{tier}")
}
