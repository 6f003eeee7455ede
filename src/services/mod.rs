// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - session, filter and presentation logic.

pub mod api;
pub mod filter;
pub mod map_style;
pub mod popup;
pub mod session;

pub use api::{ApiClient, ProfileFetcher};
pub use filter::FilterCompiler;
pub use map_style::MapStyleSelector;
pub use popup::{PopupContent, PopupFormatter};
pub use session::{
    AuthSession, Clock, HintStore, ManualClock, MemoryHintStore, SessionCache, SessionState,
    SystemClock,
};
