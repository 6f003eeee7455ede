// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity feature properties as they arrive from the tile archive.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Properties of one activity feature, as shown in the map popup.
///
/// Every field is optional. Tile properties are loosely typed, so numbers
/// may arrive as strings and ids as integers; anything that cannot be read
/// is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ActivityRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    /// Sport type (Ride, Run, Hike, etc.)
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub activity_type: Option<String>,
    /// Activity id on the external activity site
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    /// Local start time, usually ISO 8601
    #[serde(default, deserialize_with = "lenient_string")]
    pub start_date_local: Option<String>,
    #[serde(rename = "distance", default, deserialize_with = "lenient_f64")]
    pub distance_meters: Option<f64>,
    #[serde(
        rename = "total_elevation_gain",
        default,
        deserialize_with = "lenient_f64"
    )]
    pub elevation_gain_meters: Option<f64>,
    #[serde(rename = "elapsed_time", default, deserialize_with = "lenient_f64")]
    pub elapsed_time_seconds: Option<f64>,
}

impl ActivityRecord {
    /// Distance in meters, 0 when missing.
    pub fn distance(&self) -> f64 {
        self.distance_meters.unwrap_or(0.0)
    }

    /// Elevation gain in meters, 0 when missing.
    pub fn elevation_gain(&self) -> f64 {
        self.elevation_gain_meters.unwrap_or(0.0)
    }

    /// Elapsed time in seconds, 0 when missing.
    pub fn elapsed_time(&self) -> f64 {
        self.elapsed_time_seconds.unwrap_or(0.0)
    }
}

/// Accept a string or a number; empty strings count as missing.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Accept a number or a numeric string; everything else is missing.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
        .filter(|n| n.is_finite()))
}
