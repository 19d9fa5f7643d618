//! Unit coverage for weights and the rating scorer.

use std::collections::BTreeMap;

use innsight_core::{Accommodation, AccommodationScorer, ScoreError};
use rstest::{fixture, rstest};

use crate::{ComponentScores, RatingScorer, RatingWeights, WeightsError};

#[expect(clippy::float_arithmetic, reason = "assertions compare within a tolerance")]
fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[fixture]
fn bare() -> Accommodation {
    Accommodation::at(7, 26.2, 127.7)
}

#[rstest]
fn default_weights_match_documented_values() {
    let weights = RatingWeights::default();
    assert_eq!(
        weights.entries(),
        [
            ("tier", 4.0),
            ("rating", 2.0),
            ("parking", 1.0),
            ("wheelchair", 1.0),
            ("kids", 1.0),
            ("pet", 1.0),
        ]
    );
    assert_close(weights.total(), 10.0);
}

#[rstest]
fn overrides_replace_known_keys_only() {
    let overrides = BTreeMap::from([
        ("tier".to_owned(), 1.0),
        ("pet".to_owned(), 0.0),
        ("breakfast".to_owned(), 100.0),
    ]);

    let weights = RatingWeights::default().with_overrides(&overrides);

    assert_close(weights.tier, 1.0);
    assert_close(weights.pet, 0.0);
    assert_close(weights.rating, 2.0);
    assert_close(weights.total(), 6.0);
}

#[rstest]
#[case("tier", -1.0, WeightsError::Negative { key: "tier", value: -1.0 })]
#[case("kids", f64::NAN, WeightsError::NonFinite { key: "kids" })]
#[case("rating", f64::INFINITY, WeightsError::NonFinite { key: "rating" })]
fn invalid_weights_are_rejected(#[case] key: &str, #[case] value: f64, #[case] expected: WeightsError) {
    let overrides = BTreeMap::from([(key.to_owned(), value)]);
    let weights = RatingWeights::default().with_overrides(&overrides);

    let err = RatingScorer::new(weights).expect_err("weights should be rejected");

    match (&err, &expected) {
        (WeightsError::NonFinite { key: got }, WeightsError::NonFinite { key: want }) => {
            assert_eq!(got, want);
        }
        _ => assert_eq!(err, expected),
    }
}

#[rstest]
fn all_zero_weights_are_rejected() {
    let zero = RatingWeights {
        tier: 0.0,
        rating: 0.0,
        parking: 0.0,
        wheelchair: 0.0,
        kids: 0.0,
        pet: 0.0,
    };

    assert_eq!(RatingScorer::new(zero).expect_err("zero total"), WeightsError::ZeroTotal);
}

#[rstest]
fn weights_deserialise_with_defaults() {
    let weights: RatingWeights =
        serde_json::from_str(r#"{"tier": 8.0, "pet": 0.5}"#).expect("valid weights");
    assert_close(weights.tier, 8.0);
    assert_close(weights.pet, 0.5);
    assert_close(weights.rating, 2.0);
}

#[rstest]
#[case(0, 3, 0.0)]
#[case(1, 3, 100.0 / 3.0)]
#[case(2, 3, 200.0 / 3.0)]
#[case(3, 3, 100.0)]
#[case(0, 0, 0.0)]
#[expect(clippy::float_arithmetic, reason = "expected values are fractions")]
fn tier_component_scales_to_percentage(
    bare: Accommodation,
    #[case] tier: usize,
    #[case] max_tier: usize,
    #[case] expected: f64,
) {
    let components = RatingScorer::default()
        .components(&bare, tier, max_tier)
        .expect("tier in range");
    assert_close(components.tier, expected);
}

#[rstest]
fn tier_above_maximum_is_an_error(bare: Accommodation) {
    assert_eq!(
        RatingScorer::default().score(&bare, 4, 3),
        Err(ScoreError::TierOutOfRange { tier: 4, max_tier: 3 })
    );
}

#[rstest]
#[case(Some(5.0), 100.0)]
#[case(Some(4.0), 80.0)]
#[case(Some(0.0), 0.0)]
#[case(None, 50.0)]
#[case(Some(f64::NAN), 50.0)]
fn rating_component_maps_five_stars_to_percentage(
    #[case] rating: Option<f64>,
    #[case] expected: f64,
) {
    let mut hotel = Accommodation::at(1, 26.2, 127.7);
    hotel.rating = rating;

    let components = RatingScorer::default()
        .components(&hotel, 0, 3)
        .expect("tier in range");

    assert_close(components.rating, expected);
}

#[rstest]
fn amenity_tags_score_yes_no_missing_and_unknown() {
    let hotel = Accommodation::at(1, 26.2, 127.7)
        .with_tag("parking", "yes")
        .with_tag("wheelchair", "no")
        .with_tag("pet", "limited");

    let components = RatingScorer::default()
        .components(&hotel, 3, 3)
        .expect("tier in range");

    assert_eq!(
        components,
        ComponentScores {
            tier: 100.0,
            rating: 50.0,
            parking: 100.0,
            wheelchair: 0.0,
            kids: 50.0,
            pet: 50.0,
        }
    );
}

#[rstest]
fn final_score_is_weighted_average() {
    // tier 2/3 -> 66.67 * 4, rating 4/5 -> 80 * 2, parking 100, wheelchair 0,
    // kids 50, pet 50: (266.67 + 160 + 200) / 10.
    let hotel = Accommodation::at(1, 26.2, 127.7)
        .with_rating(4.0)
        .with_tag("parking", "yes")
        .with_tag("wheelchair", "no");

    let score = RatingScorer::default().score(&hotel, 2, 3).expect("valid score");

    assert_close(score, 62.666_666_666_666_67);
}

#[rstest]
fn zero_weight_components_are_ignored(bare: Accommodation) {
    let overrides = BTreeMap::from([
        ("rating".to_owned(), 0.0),
        ("parking".to_owned(), 0.0),
        ("wheelchair".to_owned(), 0.0),
        ("kids".to_owned(), 0.0),
        ("pet".to_owned(), 0.0),
    ]);
    let scorer = RatingScorer::new(RatingWeights::default().with_overrides(&overrides))
        .expect("tier weight remains");

    assert_close(scorer.score(&bare, 3, 3).expect("valid score"), 100.0);
    assert_close(scorer.score(&bare, 0, 3).expect("valid score"), 0.0);
}

#[rstest]
fn unrated_untagged_accommodation_scores_neutral_outside_tiers(bare: Accommodation) {
    // tier 0 -> 0 * 4, everything else 50 * 6: 300 / 10.
    assert_close(
        RatingScorer::default().score(&bare, 0, 3).expect("valid score"),
        30.0,
    );
}
