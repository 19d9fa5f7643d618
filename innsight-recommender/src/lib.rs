//! Accommodation recommendation pipeline for Innsight.
//!
//! Responsibilities:
//! - Turn a [`RecommendationQuery`] into a ranked [`Recommendation`] by
//!   wiring geocoding, accommodation search, isochrones, tiering and scoring.
//! - Cache finished recommendations and expose cache telemetry for health
//!   endpoints.
//!
//! Boundaries:
//! - Collaborators are traits from `innsight-core`; concrete geocoding and
//!   accommodation search clients live elsewhere.
//! - Free-text query parsing happens upstream.
//!
//! # Examples
//!
//! ```no_run
//! use innsight_data::routing::OrsConfig;
//! use innsight_recommender::{RecommenderConfig, ors_isochrone_source};
//!
//! let config = RecommenderConfig::from_json_str(r#"{"profile": "driving-car"}"#)?;
//! let isochrones = ors_isochrone_source(OrsConfig::from_env()?, &config)?;
//! // Combine with a geocoder and accommodation source to build a `Recommender`.
//! # let _ = isochrones;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod recommender;

pub use recommender::{
    IntervalInfo, MainPoi, OrsIsochroneSource, RankedAccommodation, RecommendError,
    Recommendation, RecommendationQuery, Recommender, RecommenderConfig, RecommenderConfigError,
    UNKNOWN_NAME, ors_isochrone_source,
};
