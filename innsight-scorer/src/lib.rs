//! Accommodation scoring for Innsight recommendations.
//!
//! [`RatingScorer`] implements
//! [`AccommodationScorer`](innsight_core::AccommodationScorer) by combining
//! the isochrone tier, the guest rating and four amenity tags into a single
//! `0..=100` score. Component weights come from [`RatingWeights`]; callers
//! may override individual weights per request.
//!
//! # Examples
//!
//! ```
//! use std::collections::BTreeMap;
//! use innsight_core::{Accommodation, AccommodationScorer};
//! use innsight_scorer::{RatingScorer, RatingWeights};
//!
//! let overrides = BTreeMap::from([("parking".to_owned(), 10.0)]);
//! let scorer = RatingScorer::new(RatingWeights::default().with_overrides(&overrides))?;
//!
//! let with_parking = Accommodation::at(1, 26.2, 127.7).with_tag("parking", "yes");
//! let without = Accommodation::at(2, 26.2, 127.7).with_tag("parking", "no");
//!
//! assert!(scorer.score(&with_parking, 2, 3)? > scorer.score(&without, 2, 3)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
mod rating;
mod weights;

#[cfg(test)]
mod tests;

pub use error::WeightsError;
pub use rating::{AMENITY_KEYS, ComponentScores, RatingScorer};
pub use weights::RatingWeights;
