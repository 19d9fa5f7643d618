//! Assign proximity tiers from ordered isochrone polygons.
//!
//! Layers are ordered from the shortest travel time to the longest. For `N`
//! layers, containment in layer `i` is worth tier `N - i`; a point takes the
//! highest tier of any layer containing it and tier `0` when none does.
//!
//! Polygons are dilated by a small buffer before testing so points sitting on
//! a boundary, or within rounding noise of one, count as inside.

use std::collections::HashMap;
use std::fmt;

use geo::{Contains, Distance, Euclidean, Geometry, Point, Polygon};
use thiserror::Error;

use crate::Locatable;

/// Default boundary buffer in degrees.
pub const DEFAULT_BUFFER: f64 = 1e-5;

/// Scale used to bucket coordinates to eight decimal places.
const DEDUP_SCALE: f64 = 1e8;

/// Which half of a coordinate pair is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingCoordinate {
    /// Latitude is absent.
    Latitude,
    /// Longitude is absent.
    Longitude,
    /// Neither value is present.
    Both,
}

impl fmt::Display for MissingCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latitude => f.write_str("latitude"),
            Self::Longitude => f.write_str("longitude"),
            Self::Both => f.write_str("latitude or longitude"),
        }
    }
}

/// Errors returned by [`TierClassifier::classify`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TierError {
    /// A row lacks part of its position.
    #[error("row {row} is missing {missing}")]
    MissingCoordinate {
        /// Index of the first incomplete row.
        row: usize,
        /// The absent coordinate.
        missing: MissingCoordinate,
    },
    /// A layer was an empty collection.
    #[error("layer {layer} is malformed: collection must not be empty")]
    EmptyLayer {
        /// Index of the offending layer.
        layer: usize,
    },
    /// A layer did not resolve to a polygon.
    #[error("layer {layer} is malformed: expected Polygon, found {found}")]
    UnexpectedGeometry {
        /// Index of the offending layer.
        layer: usize,
        /// Geometry type that was supplied.
        found: &'static str,
    },
}

/// A row annotated with its position and tier.
#[derive(Debug, Clone, PartialEq)]
pub struct Tiered<T> {
    /// The original row.
    pub item: T,
    /// The unbuffered `(lon, lat)` position of the row.
    pub point: Point<f64>,
    /// Proximity tier in `0..=N`.
    pub tier: usize,
}

/// Classifies points against ordered isochrone layers.
///
/// # Examples
///
/// ```
/// use geo::{Geometry, polygon};
/// use innsight_core::{Accommodation, TierClassifier};
///
/// let inner = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)];
/// let outer = polygon![(x: -5.0, y: -5.0), (x: 5.0, y: -5.0), (x: 5.0, y: 5.0), (x: -5.0, y: 5.0)];
/// let layers = vec![Geometry::Polygon(inner), Geometry::Polygon(outer)];
///
/// let rows = vec![Accommodation::at(1, 0.5, 0.5), Accommodation::at(2, 3.0, 3.0)];
/// let tiered = TierClassifier::default().classify(rows, &layers)?;
/// let tiers: Vec<usize> = tiered.iter().map(|t| t.tier).collect();
/// assert_eq!(tiers, vec![2, 1]);
/// # Ok::<(), innsight_core::TierError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierClassifier {
    buffer: f64,
}

impl Default for TierClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER)
    }
}

impl TierClassifier {
    /// Create a classifier dilating polygons by `buffer` degrees.
    ///
    /// Zero, negative and non-finite buffers disable dilation, leaving a
    /// strict interior test in which boundary points are outside.
    #[must_use]
    pub const fn new(buffer: f64) -> Self {
        Self { buffer }
    }

    /// The configured buffer distance.
    #[must_use]
    pub const fn buffer(&self) -> f64 {
        self.buffer
    }

    /// Tier every row against `layers`.
    ///
    /// Each layer must be a polygon or a non-empty geometry collection whose
    /// first member is a polygon. Rows sharing a position after rounding to
    /// eight decimal places are tested once.
    ///
    /// # Errors
    /// Returns [`TierError::MissingCoordinate`] for the first row without a
    /// full position, and [`TierError::EmptyLayer`] or
    /// [`TierError::UnexpectedGeometry`] for the first unusable layer.
    pub fn classify<T: Locatable>(
        &self,
        rows: Vec<T>,
        layers: &[Geometry<f64>],
    ) -> Result<Vec<Tiered<T>>, TierError> {
        let positions = positions(&rows)?;
        let polygons = layers
            .iter()
            .enumerate()
            .map(|(layer, geometry)| resolve_layer(layer, geometry))
            .collect::<Result<Vec<_>, _>>()?;

        let mut memo: HashMap<(i64, i64), usize> = HashMap::new();
        Ok(rows
            .into_iter()
            .zip(positions)
            .map(|(item, point)| {
                let key = dedup_key(point);
                let tier = *memo
                    .entry(key)
                    .or_insert_with(|| self.tier_of(key_point(key), &polygons));
                Tiered { item, point, tier }
            })
            .collect())
    }

    fn tier_of(&self, point: Point<f64>, polygons: &[&Polygon<f64>]) -> usize {
        let count = polygons.len();
        polygons
            .iter()
            .enumerate()
            .filter(|(_, polygon)| self.within(point, polygon))
            .map(|(index, _)| count - index)
            .max()
            .unwrap_or(0)
    }

    fn within(&self, point: Point<f64>, polygon: &Polygon<f64>) -> bool {
        if self.buffer > 0.0 && self.buffer.is_finite() {
            // Distance to a polygon is zero inside it, so this is containment
            // in the polygon dilated by `buffer`.
            Euclidean.distance(&point, polygon) <= self.buffer
        } else {
            polygon.contains(&point)
        }
    }
}

/// Tier `rows` with a one-off classifier.
///
/// # Errors
/// See [`TierClassifier::classify`].
pub fn assign_tiers<T: Locatable>(
    rows: Vec<T>,
    layers: &[Geometry<f64>],
    buffer: f64,
) -> Result<Vec<Tiered<T>>, TierError> {
    TierClassifier::new(buffer).classify(rows, layers)
}

fn positions<T: Locatable>(rows: &[T]) -> Result<Vec<Point<f64>>, TierError> {
    rows.iter()
        .enumerate()
        .map(|(row, item)| {
            let lat = item.latitude().filter(|v| !v.is_nan());
            let lon = item.longitude().filter(|v| !v.is_nan());
            match (lat, lon) {
                (Some(lat), Some(lon)) => Ok(Point::new(lon, lat)),
                (None, Some(_)) => Err(TierError::MissingCoordinate {
                    row,
                    missing: MissingCoordinate::Latitude,
                }),
                (Some(_), None) => Err(TierError::MissingCoordinate {
                    row,
                    missing: MissingCoordinate::Longitude,
                }),
                (None, None) => Err(TierError::MissingCoordinate {
                    row,
                    missing: MissingCoordinate::Both,
                }),
            }
        })
        .collect()
}

fn resolve_layer(layer: usize, geometry: &Geometry<f64>) -> Result<&Polygon<f64>, TierError> {
    match geometry {
        Geometry::Polygon(polygon) => Ok(polygon),
        Geometry::GeometryCollection(collection) => match collection.0.first() {
            None => Err(TierError::EmptyLayer { layer }),
            Some(Geometry::Polygon(polygon)) => Ok(polygon),
            Some(other) => Err(TierError::UnexpectedGeometry {
                layer,
                found: geometry_name(other),
            }),
        },
        other => Err(TierError::UnexpectedGeometry {
            layer,
            found: geometry_name(other),
        }),
    }
}

const fn geometry_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    reason = "coordinates are bucketed to eight decimal places"
)]
fn dedup_key(point: Point<f64>) -> (i64, i64) {
    (
        (point.y() * DEDUP_SCALE).round() as i64,
        (point.x() * DEDUP_SCALE).round() as i64,
    )
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "bucketed coordinates are scaled back to degrees"
)]
fn key_point((lat, lon): (i64, i64)) -> Point<f64> {
    Point::new(lon as f64 / DEDUP_SCALE, lat as f64 / DEDUP_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Accommodation;
    use geo::{GeometryCollection, LineString, polygon};
    use rstest::{fixture, rstest};

    fn square(half: f64) -> Polygon<f64> {
        polygon![
            (x: -half, y: -half),
            (x: half, y: -half),
            (x: half, y: half),
            (x: -half, y: half),
        ]
    }

    #[fixture]
    fn nested_layers() -> Vec<Geometry<f64>> {
        vec![
            Geometry::Polygon(square(1.0)),
            Geometry::Polygon(square(2.0)),
            Geometry::Polygon(square(4.0)),
        ]
    }

    fn tiers(tiered: &[Tiered<Accommodation>]) -> Vec<usize> {
        tiered.iter().map(|t| t.tier).collect()
    }

    #[rstest]
    fn nested_layers_yield_descending_tiers(nested_layers: Vec<Geometry<f64>>) {
        let rows = vec![
            Accommodation::at(1, 0.5, 0.5),
            Accommodation::at(2, 1.5, 1.5),
            Accommodation::at(3, 3.0, -3.0),
            Accommodation::at(4, 10.0, 10.0),
        ];

        let tiered = TierClassifier::default()
            .classify(rows, &nested_layers)
            .expect("classification succeeds");

        assert_eq!(tiers(&tiered), vec![3, 2, 1, 0]);
    }

    #[rstest]
    fn highest_tier_wins_for_non_nested_layers() {
        // The fastest polygon sits outside the slower one.
        let fast = polygon![(x: 10.0, y: 10.0), (x: 11.0, y: 10.0), (x: 11.0, y: 11.0), (x: 10.0, y: 11.0)];
        let layers = vec![Geometry::Polygon(fast), Geometry::Polygon(square(1.0))];
        let rows = vec![Accommodation::at(1, 10.5, 10.5), Accommodation::at(2, 0.0, 0.0)];

        let tiered = TierClassifier::default()
            .classify(rows, &layers)
            .expect("classification succeeds");

        assert_eq!(tiers(&tiered), vec![2, 1]);
    }

    #[rstest]
    fn boundary_point_needs_buffer(nested_layers: Vec<Geometry<f64>>) {
        let on_edge = || vec![Accommodation::at(1, 0.0, 1.0)];

        let strict = TierClassifier::new(0.0)
            .classify(on_edge(), &nested_layers)
            .expect("classification succeeds");
        let buffered = TierClassifier::default()
            .classify(on_edge(), &nested_layers)
            .expect("classification succeeds");

        assert_eq!(tiers(&strict), vec![2]);
        assert_eq!(tiers(&buffered), vec![3]);
    }

    #[rstest]
    fn point_just_outside_is_caught_by_buffer(nested_layers: Vec<Geometry<f64>>) {
        let rows = vec![Accommodation::at(1, 0.0, 1.000_005)];

        let tiered = TierClassifier::default()
            .classify(rows, &nested_layers)
            .expect("classification succeeds");

        assert_eq!(tiers(&tiered), vec![3]);
    }

    #[rstest]
    fn output_keeps_raw_point_and_rows(nested_layers: Vec<Geometry<f64>>) {
        let rows = vec![Accommodation::at(42, 0.25, -0.75).with_name("Inn")];

        let tiered = TierClassifier::default()
            .classify(rows, &nested_layers)
            .expect("classification succeeds");

        let first = tiered.first().expect("one row");
        assert_eq!(first.point, Point::new(-0.75, 0.25));
        assert_eq!(first.item.osm_id, 42);
        assert_eq!(first.item.name.as_deref(), Some("Inn"));
    }

    #[rstest]
    fn duplicate_coordinates_share_a_tier(nested_layers: Vec<Geometry<f64>>) {
        let rows = vec![
            Accommodation::at(1, 1.5, 1.5),
            Accommodation::at(2, 1.500_000_001, 1.5),
            Accommodation::at(3, 1.5, 1.5),
        ];

        let tiered = TierClassifier::default()
            .classify(rows, &nested_layers)
            .expect("classification succeeds");

        assert_eq!(tiers(&tiered), vec![2, 2, 2]);
    }

    #[rstest]
    fn empty_rows_yield_empty_output(nested_layers: Vec<Geometry<f64>>) {
        let tiered = TierClassifier::default()
            .classify(Vec::<Accommodation>::new(), &nested_layers)
            .expect("classification succeeds");
        assert!(tiered.is_empty());
    }

    #[rstest]
    fn no_layers_means_tier_zero() {
        let tiered = TierClassifier::default()
            .classify(vec![Accommodation::at(1, 0.0, 0.0)], &[])
            .expect("classification succeeds");
        assert_eq!(tiers(&tiered), vec![0]);
    }

    #[rstest]
    #[case(Some(1.0), None, MissingCoordinate::Longitude)]
    #[case(None, Some(1.0), MissingCoordinate::Latitude)]
    #[case(None, None, MissingCoordinate::Both)]
    #[case(Some(f64::NAN), Some(1.0), MissingCoordinate::Latitude)]
    fn missing_coordinates_are_reported(
        nested_layers: Vec<Geometry<f64>>,
        #[case] lat: Option<f64>,
        #[case] lon: Option<f64>,
        #[case] expected: MissingCoordinate,
    ) {
        let rows = vec![
            Accommodation::at(1, 0.0, 0.0),
            Accommodation::new(2, lat, lon, std::collections::HashMap::new()),
        ];

        let err = TierClassifier::default()
            .classify(rows, &nested_layers)
            .expect_err("incomplete row rejected");

        assert_eq!(
            err,
            TierError::MissingCoordinate {
                row: 1,
                missing: expected
            }
        );
    }

    #[rstest]
    fn collection_layers_use_first_polygon() {
        let layers = vec![
            Geometry::GeometryCollection(GeometryCollection::from(vec![Geometry::Polygon(
                square(1.0),
            )])),
            Geometry::Polygon(square(2.0)),
        ];

        let tiered = TierClassifier::default()
            .classify(vec![Accommodation::at(1, 0.0, 0.0)], &layers)
            .expect("classification succeeds");

        assert_eq!(tiers(&tiered), vec![2]);
    }

    #[rstest]
    fn empty_collection_layer_rejected() {
        let layers = vec![
            Geometry::Polygon(square(1.0)),
            Geometry::GeometryCollection(GeometryCollection::from(Vec::<Geometry<f64>>::new())),
        ];

        let err = TierClassifier::default()
            .classify(vec![Accommodation::at(1, 0.0, 0.0)], &layers)
            .expect_err("empty layer rejected");

        assert_eq!(err, TierError::EmptyLayer { layer: 1 });
    }

    #[rstest]
    fn non_polygon_layers_rejected() {
        let line = Geometry::LineString(LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]));
        let nested = Geometry::GeometryCollection(GeometryCollection::from(vec![Geometry::Point(
            Point::new(0.0, 0.0),
        )]));

        let direct = TierClassifier::default()
            .classify(vec![Accommodation::at(1, 0.0, 0.0)], &[line])
            .expect_err("line rejected");
        let inside = TierClassifier::default()
            .classify(vec![Accommodation::at(1, 0.0, 0.0)], &[nested])
            .expect_err("point rejected");

        assert_eq!(
            direct,
            TierError::UnexpectedGeometry {
                layer: 0,
                found: "LineString"
            }
        );
        assert_eq!(
            inside,
            TierError::UnexpectedGeometry {
                layer: 0,
                found: "Point"
            }
        );
        assert!(direct.to_string().contains("expected Polygon, found LineString"));
    }
}
