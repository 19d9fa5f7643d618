//! Test utilities for routing providers.
//!
//! [`RecordingPause`] stands in for [`ThreadPause`](super::ThreadPause) so
//! retry tests run instantly, and [`square_isochrones`] builds simple
//! concentric layers.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use geo::{Coord, Polygon, polygon};
use innsight_core::IsochroneSet;

use super::Pause;

/// `Pause` that records requested delays instead of sleeping.
#[derive(Debug, Default)]
pub struct RecordingPause {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingPause {
    /// Delays requested so far, in order.
    #[must_use]
    pub fn recorded(&self) -> Vec<Duration> {
        self.delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Pause for RecordingPause {
    fn pause(&self, duration: Duration) {
        self.delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
    }
}

/// Axis-aligned squares around `centre`, one per half-width, in the order
/// given.
///
/// # Example
///
/// ```
/// use geo::Coord;
/// use innsight_data::routing::test_support::square_isochrones;
///
/// let set = square_isochrones(Coord { x: 127.7, y: 26.2 }, &[0.1, 0.2, 0.4]);
/// assert_eq!(set.len(), 3);
/// ```
#[must_use]
pub fn square_isochrones(centre: Coord<f64>, half_widths: &[f64]) -> IsochroneSet {
    IsochroneSet::new(half_widths.iter().map(|&half| square(centre, half)).collect())
}

#[expect(clippy::float_arithmetic, reason = "square corners are offsets from the centre")]
fn square(centre: Coord<f64>, half: f64) -> Polygon<f64> {
    polygon![
        (x: centre.x - half, y: centre.y - half),
        (x: centre.x + half, y: centre.y - half),
        (x: centre.x + half, y: centre.y + half),
        (x: centre.x - half, y: centre.y + half),
    ]
}
