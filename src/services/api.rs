// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ridelines API client.
//!
//! Handles:
//! - User profile and tile archive lookup (`GET /user`)
//! - Sync status and sync trigger
//! - Mapping HTTP failures onto `ProfileFetchError`

use crate::config::Config;
use crate::error::ProfileFetchError;
use crate::models::{ProfileResponse, SyncResponse, SyncStatus};
use serde::Deserialize;
use std::future::Future;

/// Capability to fetch the current user's profile.
///
/// `SessionCache` is generic over this so that tests and alternative auth
/// providers can stand in for the HTTP client.
pub trait ProfileFetcher: Send + Sync + 'static {
    fn fetch_profile(
        &self,
    ) -> impl Future<Output = Result<ProfileResponse, ProfileFetchError>> + Send;
}

/// Ridelines REST API client.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl ApiClient {
    /// Create a client for the API rooted at `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer_token: None,
        }
    }

    /// Create a client from application config (timeout and token applied).
    pub fn from_config(config: &Config) -> Result<Self, ProfileFetchError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| ProfileFetchError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            bearer_token: config.api_token.clone(),
        })
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the user profile and tile archive URL.
    pub async fn get_user(&self) -> Result<ProfileResponse, ProfileFetchError> {
        self.get_json("/user").await
    }

    /// Get sync status for the authenticated user.
    pub async fn get_sync_status(&self) -> Result<SyncStatus, ProfileFetchError> {
        self.get_json("/sync/status").await
    }

    /// Trigger activity synchronization.
    pub async fn trigger_sync(&self) -> Result<SyncResponse, ProfileFetchError> {
        let url = format!("{}/sync", self.base_url);
        let response = self
            .authorize(self.http.post(&url))
            .send()
            .await
            .map_err(|e| ProfileFetchError::Network(e.to_string()))?;

        let result = self.check_response_json(response).await;
        if result.is_ok() {
            tracing::info!("Activity sync triggered");
        }
        result
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
    ) -> Result<T, ProfileFetchError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .authorize(self.http.get(&url))
            .send()
            .await
            .map_err(|e| ProfileFetchError::Network(e.to_string()))?;

        self.check_response_json(response).await
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Check response status and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ProfileFetchError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 401 || status.as_u16() == 403 {
                tracing::debug!(status = %status, "API rejected session");
                return Err(ProfileFetchError::Unauthenticated);
            }

            return Err(ProfileFetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProfileFetchError::Network(e.to_string()))?;

        serde_json::from_slice(&bytes).map_err(|e| ProfileFetchError::MalformedPayload(e.to_string()))
    }
}

impl ProfileFetcher for ApiClient {
    fn fetch_profile(
        &self,
    ) -> impl Future<Output = Result<ProfileResponse, ProfileFetchError>> + Send {
        self.get_user()
    }
}
