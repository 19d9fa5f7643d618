//! OpenRouteService isochrone response handling.
//!
//! A successful response is a GeoJSON feature collection with one feature per
//! requested range. The service may also answer with a top-level `error`
//! object, sometimes with HTTP 200, which is treated as a fatal API failure.
//!
//! See: <https://openrouteservice.org/dev/#/api-docs/v2/isochrones>

use geo::{Coord, LineString, Polygon};
use innsight_core::{FetchError, IsochroneSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body for `POST /isochrones/{profile}`.
#[derive(Debug, Serialize)]
pub(crate) struct IsochroneBody {
    /// Origins as `[lon, lat]` pairs.
    pub locations: Vec<[f64; 2]>,
    /// Ranges in seconds.
    pub range: Vec<u32>,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Option<RawGeometry>,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

/// Decode a response body into polygons, preserving feature order.
///
/// Only `Polygon` features contribute; each contributes its outer ring.
pub(crate) fn parse_isochrones(body: &str) -> Result<IsochroneSet, FetchError> {
    let value: Value = serde_json::from_str(body).map_err(malformed)?;
    let Some(object) = value.as_object() else {
        return Err(FetchError::MalformedResponse {
            message: "expected a JSON object".to_owned(),
        });
    };
    if let Some(error) = object.get("error") {
        return Err(api_error(error));
    }

    let collection: FeatureCollection = serde_json::from_value(value).map_err(malformed)?;
    let polygons = collection
        .features
        .into_iter()
        .filter_map(|feature| feature.geometry)
        .filter(|geometry| geometry.kind == "Polygon")
        .map(|geometry| outer_ring(geometry.coordinates))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(IsochroneSet::new(polygons))
}

fn outer_ring(coordinates: Value) -> Result<Polygon<f64>, FetchError> {
    let rings: Vec<Vec<Vec<f64>>> = serde_json::from_value(coordinates).map_err(malformed)?;
    let exterior = rings
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::MalformedResponse {
            message: "polygon without rings".to_owned(),
        })?;
    let coords = exterior
        .iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] => Ok(Coord { x: *x, y: *y }),
            _ => Err(FetchError::MalformedResponse {
                message: format!("position with {} values", position.len()),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(LineString::from(coords), Vec::new()))
}

fn api_error(error: &Value) -> FetchError {
    match error {
        Value::Object(fields) => FetchError::Api {
            code: fields.get("code").and_then(Value::as_i64),
            message: fields
                .get("message")
                .and_then(Value::as_str)
                .map_or_else(|| error.to_string(), str::to_owned),
        },
        Value::String(message) => FetchError::Api {
            code: None,
            message: message.clone(),
        },
        other => FetchError::Api {
            code: None,
            message: other.to_string(),
        },
    }
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "used directly as a map_err adaptor"
)]
fn malformed(err: serde_json::Error) -> FetchError {
    FetchError::MalformedResponse {
        message: err.to_string(),
    }
}
