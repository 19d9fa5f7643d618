//! Property-based tests for the tier classifier.
//!
//! # Invariants tested
//!
//! - **Range:** every tier lies in `0..=N` for `N` layers.
//! - **Idempotence:** classifying the same rows twice gives the same tiers.
//! - **Buffer monotonicity:** a positive buffer never lowers a tier, in
//!   particular for points lying exactly on a layer boundary.
//! - **Row preservation:** output has one entry per input row, in order.

use geo::{Geometry, Polygon, polygon};
use innsight_core::{Accommodation, TierClassifier};
use proptest::prelude::*;

fn square(half: f64) -> Polygon<f64> {
    polygon![
        (x: -half, y: -half),
        (x: half, y: -half),
        (x: half, y: half),
        (x: -half, y: half),
    ]
}

/// Squares centred on the origin; not necessarily nested or sorted.
fn layers_strategy() -> impl Strategy<Value = Vec<Geometry<f64>>> {
    prop::collection::vec(0.1_f64..6.0, 0..5)
        .prop_map(|sizes| sizes.into_iter().map(|s| Geometry::Polygon(square(s))).collect())
}

fn rows_strategy() -> impl Strategy<Value = Vec<Accommodation>> {
    prop::collection::vec((-8.0_f64..8.0, -8.0_f64..8.0), 0..40).prop_map(|coords| {
        coords
            .into_iter()
            .enumerate()
            .map(|(id, (lat, lon))| Accommodation::at(id as u64, lat, lon))
            .collect()
    })
}

/// Points placed exactly on the edges of the squares used by
/// [`nested_layers`].
fn boundary_rows_strategy() -> impl Strategy<Value = Vec<Accommodation>> {
    prop::collection::vec((prop::sample::select(vec![1.0_f64, 2.0, 4.0]), -1.0_f64..=1.0, any::<bool>()), 1..20)
        .prop_map(|edges| {
            edges
                .into_iter()
                .enumerate()
                .map(|(id, (half, t, vertical))| {
                    let along = t * half;
                    if vertical {
                        Accommodation::at(id as u64, along, half)
                    } else {
                        Accommodation::at(id as u64, -half, along)
                    }
                })
                .collect()
        })
}

fn nested_layers() -> Vec<Geometry<f64>> {
    vec![
        Geometry::Polygon(square(1.0)),
        Geometry::Polygon(square(2.0)),
        Geometry::Polygon(square(4.0)),
    ]
}

fn tiers(classifier: TierClassifier, rows: Vec<Accommodation>, layers: &[Geometry<f64>]) -> Vec<usize> {
    classifier
        .classify(rows, layers)
        .expect("generated input is well formed")
        .into_iter()
        .map(|t| t.tier)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Property: tiers never exceed the number of layers.
    #[test]
    fn tiers_within_layer_count(
        rows in rows_strategy(),
        layers in layers_strategy(),
        buffer in 0.0_f64..0.01,
    ) {
        let count = rows.len();
        let result = tiers(TierClassifier::new(buffer), rows, &layers);
        prop_assert_eq!(result.len(), count);
        prop_assert!(result.iter().all(|&tier| tier <= layers.len()));
    }

    /// Property: classification is a pure function of its inputs.
    #[test]
    fn classification_is_idempotent(rows in rows_strategy(), layers in layers_strategy()) {
        let classifier = TierClassifier::default();
        let first = tiers(classifier, rows.clone(), &layers);
        let second = tiers(classifier, rows, &layers);
        prop_assert_eq!(first, second);
    }

    /// Property: rows come back unchanged and in input order.
    #[test]
    fn rows_are_preserved_in_order(rows in rows_strategy(), layers in layers_strategy()) {
        let ids: Vec<u64> = rows.iter().map(|r| r.osm_id).collect();
        let tiered = TierClassifier::default()
            .classify(rows, &layers)
            .expect("generated input is well formed");
        let returned: Vec<u64> = tiered.iter().map(|t| t.item.osm_id).collect();
        prop_assert_eq!(ids, returned);
    }

    /// Property: boundary points never lose tiers when a buffer is applied.
    #[test]
    fn buffer_never_lowers_boundary_tiers(
        rows in boundary_rows_strategy(),
        epsilon in 1e-7_f64..0.01,
    ) {
        let layers = nested_layers();
        let strict = tiers(TierClassifier::new(0.0), rows.clone(), &layers);
        let buffered = tiers(TierClassifier::new(epsilon), rows, &layers);
        for (low, high) in strict.iter().zip(&buffered) {
            prop_assert!(high >= low, "buffered tier {} below strict tier {}", high, low);
        }
    }

    /// Property: the same monotonicity holds for arbitrary points.
    #[test]
    fn buffer_never_lowers_any_tier(
        rows in rows_strategy(),
        layers in layers_strategy(),
        epsilon in 1e-7_f64..0.5,
    ) {
        let strict = tiers(TierClassifier::new(0.0), rows.clone(), &layers);
        let buffered = tiers(TierClassifier::new(epsilon), rows, &layers);
        prop_assert!(strict.iter().zip(&buffered).all(|(low, high)| high >= low));
    }
}
