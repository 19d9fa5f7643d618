//! Relative importance of each scoring component.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::WeightsError;

/// Multipliers applied to each component score.
///
/// Keys used by [`RatingWeights::with_overrides`] and in configuration
/// documents match the field names.
///
/// # Examples
/// ```
/// use std::collections::BTreeMap;
/// use innsight_scorer::RatingWeights;
///
/// let overrides = BTreeMap::from([("rating".to_owned(), 5.0), ("spa".to_owned(), 9.0)]);
/// let weights = RatingWeights::default().with_overrides(&overrides);
///
/// assert_eq!(weights.rating, 5.0);
/// assert_eq!(weights.tier, 4.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RatingWeights {
    /// Weight of the isochrone tier component.
    pub tier: f64,
    /// Weight of the guest rating component.
    pub rating: f64,
    /// Weight of the `parking` amenity.
    pub parking: f64,
    /// Weight of the `wheelchair` amenity.
    pub wheelchair: f64,
    /// Weight of the `kids` amenity.
    pub kids: f64,
    /// Weight of the `pet` amenity.
    pub pet: f64,
}

impl Default for RatingWeights {
    fn default() -> Self {
        Self {
            tier: 4.0,
            rating: 2.0,
            parking: 1.0,
            wheelchair: 1.0,
            kids: 1.0,
            pet: 1.0,
        }
    }
}

impl RatingWeights {
    /// Replace the weights named in `overrides`, keeping the rest.
    ///
    /// Unknown keys are ignored.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, f64>) -> Self {
        for (key, &value) in overrides {
            match key.as_str() {
                "tier" => self.tier = value,
                "rating" => self.rating = value,
                "parking" => self.parking = value,
                "wheelchair" => self.wheelchair = value,
                "kids" => self.kids = value,
                "pet" => self.pet = value,
                other => log::debug!("Ignoring weight for unknown component {other}"),
            }
        }
        self
    }

    /// Component names paired with their weights.
    #[must_use]
    pub const fn entries(&self) -> [(&'static str, f64); 6] {
        [
            ("tier", self.tier),
            ("rating", self.rating),
            ("parking", self.parking),
            ("wheelchair", self.wheelchair),
            ("kids", self.kids),
            ("pet", self.pet),
        ]
    }

    /// Sum of all weights.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "weights are summed for averaging")]
    pub fn total(&self) -> f64 {
        self.entries().iter().map(|(_, weight)| weight).sum()
    }

    /// Validate the weights and return a copy.
    ///
    /// # Errors
    /// Returns [`WeightsError`] when a weight is not finite or negative, or
    /// when all weights are zero.
    pub fn validate(self) -> Result<Self, WeightsError> {
        for (key, value) in self.entries() {
            if !value.is_finite() {
                return Err(WeightsError::NonFinite { key });
            }
            if value < 0.0 {
                return Err(WeightsError::Negative { key, value });
            }
        }
        if self.total() == 0.0 {
            return Err(WeightsError::ZeroTotal);
        }
        Ok(self)
    }
}
