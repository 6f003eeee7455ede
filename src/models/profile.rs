// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile and sync payloads from the Ridelines API.

use super::activity::lenient_string;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// User profile as returned by the API.
///
/// Only identity fields are modelled; anything else the API sends is kept
/// in `extra` and passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response body of `GET /user`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileResponse {
    /// Explicit authentication flag; absent means "implied by `user`"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticated: Option<bool>,
    #[serde(default)]
    pub user: Option<UserProfile>,
    /// Locator of the user's PMTiles activity archive
    #[serde(default)]
    pub pmtiles_url: Option<String>,
}

impl ProfileResponse {
    /// Whether this payload describes a signed-in user.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated != Some(false) && self.user.is_some()
    }

    /// Tile archive URL with blank values treated as absent.
    pub fn tile_resource_url(&self) -> Option<&str> {
        self.pmtiles_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// Response body of `GET /sync/status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub last_synced_at: Option<String>,
    #[serde(default)]
    pub activity_count: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response body of `POST /sync`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_response_keeps_extra_fields() {
        let response: ProfileResponse = serde_json::from_value(json!({
            "user": {"id": 42, "name": "Kim", "plan": "pro"},
            "pmtiles_url": "https://tiles.example.com/42.pmtiles"
        }))
        .unwrap();

        let user = response.user.as_ref().unwrap();
        assert_eq!(user.id.as_deref(), Some("42"));
        assert_eq!(user.extra.get("plan"), Some(&json!("pro")));
        assert!(response.is_authenticated());
        assert_eq!(
            response.tile_resource_url(),
            Some("https://tiles.example.com/42.pmtiles")
        );
    }

    #[test]
    fn test_profile_response_without_user_is_unauthenticated() {
        let response: ProfileResponse =
            serde_json::from_value(json!({"pmtiles_url": "x"})).unwrap();
        assert!(!response.is_authenticated());
    }

    #[test]
    fn test_explicit_false_flag_wins() {
        let response: ProfileResponse = serde_json::from_value(json!({
            "authenticated": false,
            "user": {"id": "1"}
        }))
        .unwrap();
        assert!(!response.is_authenticated());
    }

    #[test]
    fn test_blank_tile_url_is_absent() {
        let response = ProfileResponse {
            pmtiles_url: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(response.tile_resource_url(), None);
    }
}
