// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod activity;
pub mod map;
pub mod profile;

pub use activity::ActivityRecord;
pub use map::{FilterExpression, MapStyle, SourceDescriptor, SourceKind, TerrainConfig};
pub use profile::{ProfileResponse, SyncResponse, SyncStatus, UserProfile};
