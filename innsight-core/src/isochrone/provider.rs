//! Isochrone request/response types and the provider traits.

use geo::{Coord, Geometry, Polygon};

use super::error::{FetchError, IsochroneError};
use crate::cache::PayloadLen;

/// Seconds per minute, used when converting interval lists.
const SECONDS_PER_MINUTE: u32 = 60;

/// Parameters for a single isochrone computation.
///
/// Locations are `(longitude, latitude)` coordinates with `x = longitude`;
/// ranges are travel-time thresholds in seconds, shortest first.
#[derive(Debug, Clone, PartialEq)]
pub struct IsochroneRequest {
    /// Routing profile understood by the routing service, e.g. `driving-car`.
    pub profile: String,
    /// Origins of the isochrones.
    pub locations: Vec<Coord<f64>>,
    /// Travel-time thresholds in seconds.
    pub ranges: Vec<u32>,
}

impl IsochroneRequest {
    /// Build a request for one origin from minute intervals.
    ///
    /// # Examples
    /// ```
    /// use geo::Coord;
    /// use innsight_core::IsochroneRequest;
    ///
    /// let request =
    ///     IsochroneRequest::from_minutes("driving-car", Coord { x: 127.8, y: 26.7 }, &[15, 30, 60]);
    /// assert_eq!(request.ranges, vec![900, 1800, 3600]);
    /// assert_eq!(request.locations.len(), 1);
    /// ```
    #[must_use]
    pub fn from_minutes(profile: impl Into<String>, origin: Coord<f64>, minutes: &[u32]) -> Self {
        Self {
            profile: profile.into(),
            locations: vec![origin],
            ranges: minutes
                .iter()
                .map(|m| m.saturating_mul(SECONDS_PER_MINUTE))
                .collect(),
        }
    }

    /// Deterministic identity of this request for memoisation.
    ///
    /// Coordinates are compared by bit pattern, so `-0.0` and `0.0` are
    /// distinct keys.
    #[must_use]
    pub fn cache_key(&self) -> IsochroneCacheKey {
        IsochroneCacheKey {
            operation: FETCH_OPERATION,
            profile: self.profile.clone(),
            locations: self
                .locations
                .iter()
                .map(|c| [c.x.to_bits(), c.y.to_bits()])
                .collect(),
            ranges: self.ranges.clone(),
        }
    }
}

/// Name under which isochrone fetches are memoised.
pub const FETCH_OPERATION: &str = "fetch_isochrones";

/// Hashable identity of an [`IsochroneRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IsochroneCacheKey {
    operation: &'static str,
    profile: String,
    locations: Vec<[u64; 2]>,
    ranges: Vec<u32>,
}

impl IsochroneCacheKey {
    /// Name of the memoised operation.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        self.operation
    }

    /// Routing profile of the memoised request.
    #[must_use]
    pub fn profile(&self) -> &str {
        &self.profile
    }
}

/// Travel-time polygons ordered from the shortest range to the longest.
///
/// Index 0 is the most exclusive polygon. Polygons are not required to nest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IsochroneSet {
    polygons: Vec<Polygon<f64>>,
}

impl IsochroneSet {
    /// Wrap an ordered list of polygons.
    #[must_use]
    pub const fn new(polygons: Vec<Polygon<f64>>) -> Self {
        Self { polygons }
    }

    /// Borrow the polygons, shortest range first.
    #[must_use]
    pub fn polygons(&self) -> &[Polygon<f64>] {
        &self.polygons
    }

    /// Number of polygons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    /// Report whether the set holds no polygons.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// One geometry layer per polygon, in tier order.
    #[must_use]
    pub fn layers(&self) -> Vec<Geometry<f64>> {
        self.polygons.iter().cloned().map(Geometry::Polygon).collect()
    }

    /// Outer rings as `[lon, lat]` pairs, for serialisation.
    #[must_use]
    pub fn outer_rings(&self) -> Vec<Vec<[f64; 2]>> {
        self.polygons
            .iter()
            .map(|polygon| polygon.exterior().coords().map(|c| [c.x, c.y]).collect())
            .collect()
    }
}

impl PayloadLen for IsochroneSet {
    fn payload_len(&self) -> usize {
        self.len()
    }
}

/// Fetch isochrones from a routing backend.
///
/// Implementations perform a single logical fetch; retrying and caching are
/// layered on top by wrappers implementing the same trait.
///
/// # Examples
///
/// ```rust
/// use geo::{Coord, polygon};
/// use innsight_core::{FetchError, IsochroneProvider, IsochroneRequest, IsochroneSet};
///
/// struct SquareProvider;
///
/// impl IsochroneProvider for SquareProvider {
///     fn fetch_isochrones(&self, request: &IsochroneRequest) -> Result<IsochroneSet, FetchError> {
///         let square = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)];
///         Ok(IsochroneSet::new(vec![square; request.ranges.len()]))
///     }
/// }
///
/// let request = IsochroneRequest::from_minutes("driving-car", Coord { x: 0.5, y: 0.5 }, &[15, 30]);
/// let set = SquareProvider.fetch_isochrones(&request)?;
/// assert_eq!(set.len(), 2);
/// # Ok::<(), FetchError>(())
/// ```
pub trait IsochroneProvider: Send + Sync {
    /// Fetch polygons for `request`, one per range.
    fn fetch_isochrones(&self, request: &IsochroneRequest) -> Result<IsochroneSet, FetchError>;
}

/// Obtain isochrones with local recovery already applied.
///
/// This is the boundary the recommendation pipeline depends on: transient
/// failures have been retried and, where possible, replaced by cached data.
pub trait IsochroneSource: Send + Sync {
    /// Return polygons for `request`.
    fn isochrones(&self, request: &IsochroneRequest) -> Result<IsochroneSet, IsochroneError>;
}
