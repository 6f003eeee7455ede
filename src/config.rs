// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Everything the map needs that is not user state lives here: the API
//! location, the MapTiler key, the activity-type domain for the filter, and
//! the per-type line colors.

use crate::models::MapStyle;
use crate::services::filter::{DEFAULT_LINE_COLOR, OTHER_TYPE};
use crate::services::popup::DEFAULT_LINK_LABEL;
use std::collections::HashMap;
use std::env;

/// Activity types with their own checkbox, in display order.
pub const DEFAULT_ACTIVITY_TYPES: &[&str] = &["Ride", "Run", "Walk", "Hike", "AlpineSki"];

/// Default lifetime of a cached authentication check (5 minutes).
pub const DEFAULT_AUTH_TTL_SECS: i64 = 5 * 60;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Ridelines API (no trailing slash)
    pub api_url: String,
    /// Optional bearer token sent with API requests
    pub api_token: Option<String>,
    /// MapTiler API key for base styles and terrain
    pub maptiler_api_key: String,
    /// Known activity types, excluding the "Other" bucket
    pub activity_types: Vec<String>,
    /// Line color per activity type
    pub activity_colors: HashMap<String, String>,
    /// Line color for types without their own entry
    pub default_color: String,
    /// Selectable base map styles, first is the default
    pub map_styles: Vec<MapStyle>,
    /// Initial map center as (lng, lat)
    pub default_center: (f64, f64),
    /// Initial map zoom
    pub default_zoom: f64,
    /// How long an authentication check stays cached
    pub auth_ttl: chrono::Duration,
    /// Base URL for "view activity" links in popups
    pub activity_link_base: String,
    /// Text of the popup's activity link
    pub activity_link_label: String,
    /// Request timeout applied by the HTTP client
    pub http_timeout: std::time::Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local
    /// development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let maptiler_api_key = env::var("MAPTILER_API_KEY")
            .map(|v| v.trim().to_string())
            .map_err(|_| ConfigError::Missing("MAPTILER_API_KEY"))?;
        if maptiler_api_key.is_empty() {
            return Err(ConfigError::Missing("MAPTILER_API_KEY"));
        }

        let activity_types = match env::var("RIDELINES_ACTIVITY_TYPES") {
            Ok(raw) => parse_activity_types(&raw)?,
            Err(_) => default_activity_types(),
        };

        let auth_ttl_secs = parse_or_default("RIDELINES_AUTH_TTL_SECS", DEFAULT_AUTH_TTL_SECS)?;
        let http_timeout_secs = parse_or_default("RIDELINES_HTTP_TIMEOUT_SECS", 30u64)?;

        Ok(Self {
            api_url: env::var("RIDELINES_API_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "/api".to_string()),
            api_token: env::var("RIDELINES_API_TOKEN")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            map_styles: default_map_styles(&maptiler_api_key),
            maptiler_api_key,
            activity_types,
            activity_colors: default_activity_colors(),
            default_color: DEFAULT_LINE_COLOR.to_string(),
            default_center: (-98.583, 39.833),
            default_zoom: 4.0,
            auth_ttl: chrono::Duration::seconds(auth_ttl_secs),
            activity_link_base: env::var("RIDELINES_ACTIVITY_LINK_BASE")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "https://intervals.icu/activities".to_string()),
            activity_link_label: env::var("RIDELINES_ACTIVITY_LINK_LABEL")
                .unwrap_or_else(|_| DEFAULT_LINK_LABEL.to_string()),
            http_timeout: std::time::Duration::from_secs(http_timeout_secs),
        })
    }

    /// Config for tests: no environment access, fixed values.
    pub fn test_default() -> Self {
        Self {
            api_url: "http://localhost:8787".to_string(),
            api_token: None,
            maptiler_api_key: "test_maptiler_key".to_string(),
            activity_types: default_activity_types(),
            activity_colors: default_activity_colors(),
            default_color: DEFAULT_LINE_COLOR.to_string(),
            map_styles: default_map_styles("test_maptiler_key"),
            default_center: (-98.583, 39.833),
            default_zoom: 4.0,
            auth_ttl: chrono::Duration::seconds(DEFAULT_AUTH_TTL_SECS),
            activity_link_base: "https://intervals.icu/activities".to_string(),
            activity_link_label: DEFAULT_LINK_LABEL.to_string(),
            http_timeout: std::time::Duration::from_secs(5),
        }
    }
}

fn default_activity_types() -> Vec<String> {
    DEFAULT_ACTIVITY_TYPES.iter().map(|t| t.to_string()).collect()
}

fn default_activity_colors() -> HashMap<String, String> {
    [
        ("Ride", "#14affc"),
        ("Run", "#4FFFB0"),
        ("Walk", "#fb139c"),
        ("Hike", "#fb139c"),
        ("AlpineSki", "#984ea3"),
    ]
    .into_iter()
    .map(|(t, c)| (t.to_string(), c.to_string()))
    .collect()
}

/// MapTiler base styles offered in the style picker.
pub fn default_map_styles(api_key: &str) -> Vec<MapStyle> {
    [
        ("dataviz-dark", "Dark", "dataviz-dark"),
        ("outdoor-dark", "Dark Terrain", "outdoor-v2-dark"),
        ("satellite", "Satellite", "satellite"),
    ]
    .into_iter()
    .map(|(id, name, map)| MapStyle {
        id: id.to_string(),
        name: name.to_string(),
        url: format!(
            "https://api.maptiler.com/maps/{}/style.json?key={}",
            map, api_key
        ),
    })
    .collect()
}

/// Parse a comma-separated activity type list.
///
/// Blank entries and duplicates are dropped; "Other" is reserved for the
/// catch-all bucket and rejected.
pub fn parse_activity_types(raw: &str) -> Result<Vec<String>, ConfigError> {
    let mut types: Vec<String> = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if entry == OTHER_TYPE {
            return Err(ConfigError::Invalid {
                key: "RIDELINES_ACTIVITY_TYPES",
                reason: "\"Other\" is reserved for the catch-all category".to_string(),
            });
        }
        if !types.iter().any(|t| t == entry) {
            types.push(entry.to_string());
        }
    }

    if types.is_empty() {
        return Err(ConfigError::Invalid {
            key: "RIDELINES_ACTIVITY_TYPES",
            reason: "at least one activity type is required".to_string(),
        });
    }
    Ok(types)
}

fn parse_or_default<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("MAPTILER_API_KEY", "test_key");
        env::set_var("RIDELINES_API_URL", "https://api.example.com/");
        env::set_var("RIDELINES_ACTIVITY_TYPES", "Ride, Run,,Swim");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.maptiler_api_key, "test_key");
        assert_eq!(config.api_url, "https://api.example.com");
        assert_eq!(config.activity_types, vec!["Ride", "Run", "Swim"]);
        assert_eq!(config.auth_ttl, chrono::Duration::minutes(5));
        assert!(config.map_styles[0].url.ends_with("key=test_key"));
    }

    #[test]
    fn test_parse_activity_types_dedups() {
        let types = parse_activity_types("Ride,Run,Ride").unwrap();
        assert_eq!(types, vec!["Ride", "Run"]);
    }

    #[test]
    fn test_parse_activity_types_rejects_other() {
        let err = parse_activity_types("Ride,Other").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_parse_activity_types_rejects_empty() {
        assert!(parse_activity_types(" , ,").is_err());
    }

    #[test]
    fn test_default_map_styles_embed_key() {
        let styles = default_map_styles("abc");
        assert_eq!(styles.len(), 3);
        assert_eq!(styles[1].name, "Dark Terrain");
        assert_eq!(
            styles[1].url,
            "https://api.maptiler.com/maps/outdoor-v2-dark/style.json?key=abc"
        );
    }
}
