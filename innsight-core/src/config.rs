//! Serde helpers reading durations from plain numbers.
//!
//! Configuration documents spell durations as integers or decimals in a
//! named unit (`ttl_secs`, `ttl_hours`, `delay_secs`) rather than serde's
//! default `{secs, nanos}` object.

use std::time::Duration;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

const SECS_PER_HOUR: u64 = 60 * 60;

/// Read whole seconds.
///
/// # Errors
/// Fails when the value is not an unsigned integer.
pub fn deserialize_secs<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_secs)
}

/// Read whole hours, saturating on overflow.
///
/// # Errors
/// Fails when the value is not an unsigned integer.
pub fn deserialize_hours<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(|hours| Duration::from_secs(hours.saturating_mul(SECS_PER_HOUR)))
}

/// Read fractional seconds.
///
/// # Errors
/// Fails when the value is negative, not finite or too large.
pub fn deserialize_secs_f64<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(secs).map_err(D::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "deserialize_secs")]
        secs: Duration,
        #[serde(deserialize_with = "deserialize_hours")]
        hours: Duration,
        #[serde(deserialize_with = "deserialize_secs_f64")]
        fractional: Duration,
    }

    #[rstest]
    fn reads_each_unit() {
        let sample: Sample =
            serde_json::from_str(r#"{"secs": 30, "hours": 2, "fractional": 0.25}"#)
                .expect("valid document");
        assert_eq!(sample.secs, Duration::from_secs(30));
        assert_eq!(sample.hours, Duration::from_secs(7200));
        assert_eq!(sample.fractional, Duration::from_millis(250));
    }

    #[rstest]
    fn rejects_negative_fractional_seconds() {
        let result: Result<Sample, _> =
            serde_json::from_str(r#"{"secs": 1, "hours": 1, "fractional": -1.0}"#);
        assert!(result.is_err());
    }
}
