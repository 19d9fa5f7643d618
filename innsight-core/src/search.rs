//! Contracts for the geocoding and accommodation search collaborators.
//!
//! Both services are external. The pipeline only depends on these traits, so
//! concrete HTTP clients live outside this crate.

use geo::Coord;
use thiserror::Error;

use crate::Accommodation;

/// Errors from [`Geocoder::geocode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    /// The search term matched nothing.
    #[error("no location found for {query:?}")]
    NotFound {
        /// Term that was searched for.
        query: String,
    },
    /// The geocoding service could not be reached or answered badly.
    #[error("geocoding service failed: {message}")]
    Service {
        /// Failure description.
        message: String,
    },
}

/// Resolve a free-text place name to a coordinate.
pub trait Geocoder: Send + Sync {
    /// Return the best match for `query` as `x = longitude`, `y = latitude`.
    ///
    /// An empty result set is reported as [`GeocodeError::NotFound`] and is
    /// not worth retrying.
    fn geocode(&self, query: &str) -> Result<Coord<f64>, GeocodeError>;
}

/// Errors from [`AccommodationSource::search`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The map data service could not be reached or answered badly.
    #[error("accommodation search failed: {message}")]
    Service {
        /// Failure description.
        message: String,
    },
}

/// Find accommodations around a coordinate.
pub trait AccommodationSource: Send + Sync {
    /// Return accommodations near `centre`.
    ///
    /// Rows may lack coordinates; the tier classifier rejects them.
    fn search(&self, centre: Coord<f64>) -> Result<Vec<Accommodation>, SearchError>;
}
