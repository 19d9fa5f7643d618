//! Travel-time polygons around an origin.
//!
//! [`IsochroneProvider`] abstracts a single fetch from a routing backend and
//! reports failures as [`FetchError`]. [`IsochroneSource`] is the recovered
//! boundary seen by the pipeline, failing with [`IsochroneError`] only when no
//! usable data exists.

mod error;
mod provider;

pub use error::{FetchError, FetchErrorKind, IsochroneError};
pub use provider::{
    FETCH_OPERATION, IsochroneCacheKey, IsochroneProvider, IsochroneRequest, IsochroneSet,
    IsochroneSource,
};
