//! Isochrone providers for routing services.
//!
//! Three layers stack to give the pipeline resilient travel-time polygons:
//!
//! 1. [`OrsIsochroneProvider`] makes a single call to OpenRouteService.
//! 2. [`RetryingIsochroneProvider`] retries transient failures with
//!    exponential backoff.
//! 3. [`CachedIsochroneProvider`] memoises results and serves stale data
//!    when the retries are exhausted.
//!
//! # Example
//!
//! ```no_run
//! use geo::Coord;
//! use innsight_core::{FallbackCacheConfig, IsochroneRequest, IsochroneSource};
//! use innsight_data::routing::{
//!     CachedIsochroneProvider, OrsConfig, OrsIsochroneProvider, RetryPolicy,
//!     RetryingIsochroneProvider,
//! };
//!
//! let http = OrsIsochroneProvider::with_config(OrsConfig::from_env()?)?;
//! let retrying = RetryingIsochroneProvider::new(http, RetryPolicy::default());
//! let source = CachedIsochroneProvider::new(retrying, FallbackCacheConfig::default());
//!
//! let request =
//!     IsochroneRequest::from_minutes("driving-car", Coord { x: 127.68, y: 26.21 }, &[15, 30, 60]);
//! let set = source.isochrones(&request)?;
//! println!("{} layers", set.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod fallback;
mod ors;
mod provider;
mod retry;

#[doc(hidden)]
pub mod test_support;

pub use fallback::CachedIsochroneProvider;
pub use provider::{
    ConfigError, DEFAULT_BASE_URL, DEFAULT_USER_AGENT, ORS_API_KEY_VAR, ORS_URL_VAR, OrsConfig,
    OrsIsochroneProvider, ProviderBuildError,
};
pub use retry::{Pause, RetryPolicy, RetryingIsochroneProvider, ThreadPause};
