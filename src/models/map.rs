// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Values handed to the map renderer: sources, filters, styles.
//!
//! The renderer consumes plain JSON. `FilterExpression` serializes to the
//! nested-array filter form (`["in", "type", "Ride", "Run"]`), and
//! `SourceDescriptor` to a style-spec source object.

use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Declarative layer filter over feature properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpression {
    /// `["==", property, value]`
    Equals { property: String, value: String },
    /// `["in", property, values...]`
    In {
        property: String,
        values: Vec<String>,
    },
    /// `["!in", property, values...]`
    NotIn {
        property: String,
        values: Vec<String>,
    },
    /// `["any", expr...]`
    Any(Vec<FilterExpression>),
}

impl FilterExpression {
    /// Evaluate against a feature, with the same semantics the renderer
    /// applies: a missing property never equals or is `in` anything, and is
    /// always `!in`.
    pub fn evaluate<F>(&self, get: &F) -> bool
    where
        F: Fn(&str) -> Option<String>,
    {
        match self {
            FilterExpression::Equals { property, value } => {
                get(property.as_str()).is_some_and(|v| &v == value)
            }
            FilterExpression::In { property, values } => {
                get(property.as_str()).is_some_and(|v| values.contains(&v))
            }
            FilterExpression::NotIn { property, values } => {
                !get(property.as_str()).is_some_and(|v| values.contains(&v))
            }
            FilterExpression::Any(exprs) => exprs.iter().any(|e| e.evaluate(get)),
        }
    }

    /// Evaluate against a feature that only carries a `type` property.
    pub fn matches_type(&self, activity_type: Option<&str>) -> bool {
        self.evaluate(&|property: &str| {
            if property == "type" {
                activity_type.map(str::to_string)
            } else {
                None
            }
        })
    }
}

impl Serialize for FilterExpression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FilterExpression::Equals { property, value } => {
                let mut seq = serializer.serialize_seq(Some(3))?;
                seq.serialize_element("==")?;
                seq.serialize_element(property)?;
                seq.serialize_element(value)?;
                seq.end()
            }
            FilterExpression::In { property, values } => {
                serialize_membership(serializer, "in", property, values)
            }
            FilterExpression::NotIn { property, values } => {
                serialize_membership(serializer, "!in", property, values)
            }
            FilterExpression::Any(exprs) => {
                let mut seq = serializer.serialize_seq(Some(exprs.len() + 1))?;
                seq.serialize_element("any")?;
                for expr in exprs {
                    seq.serialize_element(expr)?;
                }
                seq.end()
            }
        }
    }
}

fn serialize_membership<S: Serializer>(
    serializer: S,
    op: &str,
    property: &str,
    values: &[String],
) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(values.len() + 2))?;
    seq.serialize_element(op)?;
    seq.serialize_element(property)?;
    for value in values {
        seq.serialize_element(value)?;
    }
    seq.end()
}

/// Kind of map source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum SourceKind {
    #[serde(rename = "vector")]
    Vector,
    #[serde(rename = "raster-dem")]
    RasterDem,
}

/// A map source definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SourceDescriptor {
    #[serde(rename = "type")]
    pub kind: SourceKind,
    pub url: String,
    #[serde(rename = "tileSize", default, skip_serializing_if = "Option::is_none")]
    pub tile_size: Option<u32>,
}

impl SourceDescriptor {
    /// Vector source backed by a PMTiles archive.
    pub fn pmtiles(archive_url: &str) -> Self {
        Self {
            kind: SourceKind::Vector,
            url: format!("pmtiles://{}", archive_url),
            tile_size: None,
        }
    }
}

/// 3D terrain settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TerrainConfig {
    /// Id of the raster-dem source
    pub source: String,
    pub exaggeration: f64,
}

/// A selectable base map style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MapStyle {
    pub id: String,
    pub name: String,
    pub url: String,
}
