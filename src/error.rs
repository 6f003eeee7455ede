// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types.
//!
//! `ProfileFetchError` is what the API collaborator reports; the session
//! cache folds every variant into an unauthenticated session, so it never
//! reaches the UI as an error.

/// Failure reported by a profile fetch.
#[derive(Debug, thiserror::Error)]
pub enum ProfileFetchError {
    /// Request never produced a response (DNS, connect, timeout, TLS).
    #[error("Network error: {0}")]
    Network(String),

    /// API rejected the session, or answered without a user.
    #[error("Not authenticated")]
    Unauthenticated,

    /// Any other non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body could not be decoded.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

impl ProfileFetchError {
    /// Short machine-friendly label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ProfileFetchError::Network(_) => "network",
            ProfileFetchError::Unauthenticated => "unauthenticated",
            ProfileFetchError::Status { .. } => "status",
            ProfileFetchError::MalformedPayload(_) => "malformed_payload",
        }
    }
}
