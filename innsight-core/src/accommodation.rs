use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A place to stay returned by an accommodation search.
///
/// Coordinates are WGS84 and optional because upstream map data does not
/// always carry a position (ways without a computed centre, for example).
/// Tags mirror OpenStreetMap's free-form key/value structure.
///
/// # Examples
/// ```
/// use std::collections::HashMap;
/// use innsight_core::Accommodation;
///
/// let hotel = Accommodation::new(
///     7,
///     Some(26.69),
///     Some(127.88),
///     HashMap::from([("tourism".into(), "hotel".into())]),
/// );
///
/// assert_eq!(hotel.osm_id, 7);
/// assert_eq!(hotel.tags.get("tourism"), Some(&"hotel".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accommodation {
    /// OpenStreetMap element identifier.
    pub osm_id: u64,
    /// OpenStreetMap element type (`node`, `way` or `relation`).
    #[serde(default)]
    pub osm_type: String,
    /// Display name, when tagged.
    #[serde(default)]
    pub name: Option<String>,
    /// Latitude in degrees.
    pub lat: Option<f64>,
    /// Longitude in degrees.
    pub lon: Option<f64>,
    /// Guest rating on a `0.0..=5.0` scale, when known.
    #[serde(default)]
    pub rating: Option<f64>,
    /// OpenStreetMap-style tags.
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl Accommodation {
    /// Construct an `Accommodation` of element type `node` without a name or
    /// rating.
    #[must_use]
    pub fn new(
        osm_id: u64,
        lat: Option<f64>,
        lon: Option<f64>,
        tags: HashMap<String, String>,
    ) -> Self {
        Self {
            osm_id,
            osm_type: "node".to_owned(),
            name: None,
            lat,
            lon,
            rating: None,
            tags,
        }
    }

    /// Construct a located `Accommodation` without tags.
    ///
    /// # Examples
    /// ```
    /// use innsight_core::Accommodation;
    ///
    /// let hotel = Accommodation::at(1, 25.03, 121.56);
    /// assert!(hotel.tags.is_empty());
    /// assert_eq!(hotel.lat, Some(25.03));
    /// ```
    #[must_use]
    pub fn at(osm_id: u64, lat: f64, lon: f64) -> Self {
        Self::new(osm_id, Some(lat), Some(lon), HashMap::new())
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the guest rating.
    #[must_use]
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Add a single tag.
    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

/// Anything carrying an optional latitude/longitude pair.
///
/// The tier classifier works over any `Locatable` row so callers can tier
/// their own record types without converting them first.
pub trait Locatable {
    /// Latitude in degrees, if present.
    fn latitude(&self) -> Option<f64>;
    /// Longitude in degrees, if present.
    fn longitude(&self) -> Option<f64>;
}

impl Locatable for Accommodation {
    fn latitude(&self) -> Option<f64> {
        self.lat
    }

    fn longitude(&self) -> Option<f64> {
        self.lon
    }
}
