//! Filtering, scoring and ordering of tiered accommodations.

use innsight_core::{Accommodation, AccommodationScorer, Tiered};

use super::RecommendError;
use super::payload::{RankedAccommodation, UNKNOWN_NAME};

const REQUIRED_VALUE: &str = "yes";

/// Keep rows whose tags say `yes` to every filter, score them and sort best
/// first, breaking ties by OSM id.
///
/// # Errors
/// Returns [`RecommendError::NoAccommodation`] when filters remove every
/// row, and [`RecommendError::Scoring`] when the scorer rejects a row.
pub(crate) fn rank<S>(
    tiered: Vec<Tiered<Accommodation>>,
    scorer: &S,
    max_tier: usize,
    filters: &[String],
) -> Result<Vec<RankedAccommodation>, RecommendError>
where
    S: AccommodationScorer + ?Sized,
{
    let had_rows = !tiered.is_empty();
    let mut ranked = tiered
        .into_iter()
        .filter(|row| matches_filters(&row.item, filters))
        .map(|row| {
            let score = scorer.score(&row.item, row.tier, max_tier)?;
            Ok(into_ranked(row, score))
        })
        .collect::<Result<Vec<_>, RecommendError>>()?;

    if had_rows && ranked.is_empty() {
        return Err(RecommendError::NoAccommodation {
            filters: filters.to_vec(),
        });
    }

    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.osm_id.cmp(&b.osm_id))
    });
    Ok(ranked)
}

fn matches_filters(item: &Accommodation, filters: &[String]) -> bool {
    filters
        .iter()
        .all(|filter| item.tags.get(filter).is_some_and(|value| value == REQUIRED_VALUE))
}

fn into_ranked(row: Tiered<Accommodation>, score: f64) -> RankedAccommodation {
    let Tiered { item, point, tier } = row;
    RankedAccommodation {
        osm_id: item.osm_id,
        name: item.name.unwrap_or_else(|| UNKNOWN_NAME.to_owned()),
        score,
        tier,
        lat: point.y(),
        lon: point.x(),
        amenities: item.tags.into_iter().collect(),
    }
}
