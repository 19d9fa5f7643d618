//! Weighted scoring of accommodations on a `0..=100` scale.
//!
//! Each accommodation gets six component scores:
//! - **tier**: `tier / max_tier * 100`, so the innermost isochrone scores 100.
//! - **rating**: guest rating on a 0–5 scale mapped to 0–100.
//! - **amenities**: `parking`, `wheelchair`, `kids` and `pet` tags score 100
//!   for `yes`, 0 for `no` and 50 when absent or unrecognised.
//!
//! The final score is the weighted average of the components.

use innsight_core::{Accommodation, AccommodationScorer, ScoreError};

use crate::{RatingWeights, WeightsError};

/// Amenity tags that contribute to the score.
pub const AMENITY_KEYS: [&str; 4] = ["parking", "wheelchair", "kids", "pet"];

const FULL_SCORE: f64 = 100.0;
const NEUTRAL_SCORE: f64 = 50.0;
const MAX_RATING: f64 = 5.0;

/// Per-component scores for one accommodation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentScores {
    /// Tier component.
    pub tier: f64,
    /// Rating component.
    pub rating: f64,
    /// `parking` component.
    pub parking: f64,
    /// `wheelchair` component.
    pub wheelchair: f64,
    /// `kids` component.
    pub kids: f64,
    /// `pet` component.
    pub pet: f64,
}

impl ComponentScores {
    #[expect(clippy::float_arithmetic, reason = "weighted averages require float maths")]
    fn weighted_average(&self, weights: &RatingWeights) -> f64 {
        let total = weights.total();
        if total <= 0.0 {
            return 0.0;
        }
        let weighted = self.tier * weights.tier
            + self.rating * weights.rating
            + self.parking * weights.parking
            + self.wheelchair * weights.wheelchair
            + self.kids * weights.kids
            + self.pet * weights.pet;
        weighted / total
    }
}

/// [`AccommodationScorer`] blending tier, rating and amenity tags.
///
/// # Examples
/// ```
/// use innsight_core::{Accommodation, AccommodationScorer};
/// use innsight_scorer::RatingScorer;
///
/// let hotel = Accommodation::at(1, 26.2, 127.7)
///     .with_rating(5.0)
///     .with_tag("parking", "yes")
///     .with_tag("wheelchair", "yes")
///     .with_tag("kids", "yes")
///     .with_tag("pet", "yes");
///
/// let score = RatingScorer::default().score(&hotel, 3, 3)?;
/// assert_eq!(score, 100.0);
/// # Ok::<(), innsight_core::ScoreError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct RatingScorer {
    weights: RatingWeights,
}

impl RatingScorer {
    /// Build a scorer from validated weights.
    ///
    /// # Errors
    /// Returns [`WeightsError`] when `weights` cannot form an average.
    pub fn new(weights: RatingWeights) -> Result<Self, WeightsError> {
        Ok(Self {
            weights: weights.validate()?,
        })
    }

    /// Weights in use.
    #[must_use]
    pub const fn weights(&self) -> &RatingWeights {
        &self.weights
    }

    /// Score each component of `item` without combining them.
    ///
    /// # Errors
    /// Returns [`ScoreError::TierOutOfRange`] when `tier > max_tier`.
    pub fn components(
        &self,
        item: &Accommodation,
        tier: usize,
        max_tier: usize,
    ) -> Result<ComponentScores, ScoreError> {
        if tier > max_tier {
            return Err(ScoreError::TierOutOfRange { tier, max_tier });
        }
        let [parking, wheelchair, kids, pet] = AMENITY_KEYS.map(|key| amenity_score(item, key));
        Ok(ComponentScores {
            tier: tier_score(tier, max_tier),
            rating: item.rating.filter(|r| r.is_finite()).map_or(NEUTRAL_SCORE, rating_score),
            parking,
            wheelchair,
            kids,
            pet,
        })
    }
}

impl AccommodationScorer for RatingScorer {
    fn score(&self, item: &Accommodation, tier: usize, max_tier: usize) -> Result<f64, ScoreError> {
        Ok(self
            .components(item, tier, max_tier)?
            .weighted_average(&self.weights))
    }
}

#[expect(clippy::float_arithmetic, reason = "tiers are scaled to a percentage")]
fn tier_score(tier: usize, max_tier: usize) -> f64 {
    if max_tier == 0 {
        return 0.0;
    }
    let as_f64 = |value: usize| f64::from(u32::try_from(value).unwrap_or(u32::MAX));
    as_f64(tier) / as_f64(max_tier) * FULL_SCORE
}

#[expect(clippy::float_arithmetic, reason = "ratings are scaled to a percentage")]
fn rating_score(rating: f64) -> f64 {
    rating / MAX_RATING * FULL_SCORE
}

fn amenity_score(item: &Accommodation, key: &str) -> f64 {
    match item.tags.get(key).map(String::as_str) {
        Some("yes") => FULL_SCORE,
        Some("no") => 0.0,
        None => NEUTRAL_SCORE,
        Some(other) => {
            log::warn!("Unknown tag value '{other}' for {key}, using default 50");
            NEUTRAL_SCORE
        }
    }
}
