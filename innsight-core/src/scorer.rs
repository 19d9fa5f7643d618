//! Score accommodations once their tier is known.

use thiserror::Error;

use crate::Accommodation;

/// Errors from [`AccommodationScorer::score`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    /// The tier exceeds the number of isochrone layers.
    #[error("tier {tier} exceeds maximum tier {max_tier}")]
    TierOutOfRange {
        /// Tier supplied.
        tier: usize,
        /// Highest possible tier.
        max_tier: usize,
    },
}

/// Calculate a desirability score for an accommodation.
///
/// Scores are on a `0.0..=100.0` scale; higher is better. Implementations
/// must be thread-safe so one scorer can serve concurrent requests.
///
/// # Examples
///
/// ```rust
/// use innsight_core::{Accommodation, AccommodationScorer, ScoreError};
///
/// struct TierOnly;
///
/// impl AccommodationScorer for TierOnly {
///     fn score(&self, _item: &Accommodation, tier: usize, max_tier: usize) -> Result<f64, ScoreError> {
///         if tier > max_tier {
///             return Err(ScoreError::TierOutOfRange { tier, max_tier });
///         }
///         Ok(if tier == max_tier { 100.0 } else { 0.0 })
///     }
/// }
///
/// let hotel = Accommodation::at(1, 26.2, 127.7);
/// assert_eq!(TierOnly.score(&hotel, 3, 3)?, 100.0);
/// assert!(TierOnly.score(&hotel, 4, 3).is_err());
/// # Ok::<(), ScoreError>(())
/// ```
pub trait AccommodationScorer: Send + Sync {
    /// Score `item`, which sits in `tier` out of `0..=max_tier`.
    fn score(&self, item: &Accommodation, tier: usize, max_tier: usize)
    -> Result<f64, ScoreError>;
}
