//! Property-based tests for the rating scorer.
//!
//! # Invariants tested
//!
//! - **Range:** with ratings on the 0–5 scale every score lies in `0..=100`.
//! - **Tier monotonicity:** moving an accommodation to a higher tier never
//!   lowers its score.

use innsight_core::{Accommodation, AccommodationScorer};
use innsight_scorer::{AMENITY_KEYS, RatingScorer, RatingWeights};
use proptest::prelude::*;

fn weights_strategy() -> impl Strategy<Value = RatingWeights> {
    (0.01_f64..10.0, prop::array::uniform5(0.0_f64..10.0)).prop_map(
        |(tier, [rating, parking, wheelchair, kids, pet])| RatingWeights {
            tier,
            rating,
            parking,
            wheelchair,
            kids,
            pet,
        },
    )
}

fn accommodation_strategy() -> impl Strategy<Value = Accommodation> {
    let tag = prop::option::of(prop::sample::select(vec!["yes", "no", "maybe"]));
    (
        prop::option::of(0.0_f64..=5.0),
        prop::array::uniform4(tag),
    )
        .prop_map(|(rating, tags)| {
            let mut hotel = Accommodation::at(1, 26.2, 127.7);
            hotel.rating = rating;
            for (key, value) in AMENITY_KEYS.iter().zip(tags) {
                if let Some(value) = value {
                    hotel = hotel.with_tag(*key, value);
                }
            }
            hotel
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn scores_stay_within_percentage_range(
        weights in weights_strategy(),
        hotel in accommodation_strategy(),
        max_tier in 0_usize..6,
        tier_seed in 0_usize..6,
    ) {
        let scorer = RatingScorer::new(weights).expect("positive tier weight");
        let tier = tier_seed.min(max_tier);
        let score = scorer.score(&hotel, tier, max_tier).expect("tier in range");
        prop_assert!((0.0..=100.0 + 1e-9).contains(&score), "score {score} out of range");
    }

    #[test]
    fn higher_tiers_never_score_lower(
        weights in weights_strategy(),
        hotel in accommodation_strategy(),
        max_tier in 1_usize..6,
    ) {
        let scorer = RatingScorer::new(weights).expect("positive tier weight");
        let scores: Vec<f64> = (0..=max_tier)
            .map(|tier| scorer.score(&hotel, tier, max_tier).expect("tier in range"))
            .collect();
        for pair in scores.windows(2) {
            if let [lower, higher] = pair {
                prop_assert!(higher >= lower, "scores not monotone: {scores:?}");
            }
        }
    }
}
