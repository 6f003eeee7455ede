// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{DateTime, Utc};
use ridelines_map::error::ProfileFetchError;
use ridelines_map::models::{ProfileResponse, UserProfile};
use ridelines_map::services::{ManualClock, ProfileFetcher, SessionCache};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

pub const API_URL: &str = "https://api.ridelines.test";
pub const TILES_A: &str = "https://tiles.ridelines.test/u1-a.pmtiles";
pub const TILES_B: &str = "https://tiles.ridelines.test/u1-b.pmtiles";

type Scripted = (Result<ProfileResponse, ProfileFetchError>, Option<Duration>);

/// Profile fetcher that replays queued responses.
///
/// Each call takes the next queued response when it starts. When gated, a
/// fetch then waits for a permit from `release` before answering, which
/// lets tests hold a fetch in flight. Responses queued with a delay answer
/// only after that delay.
pub struct ScriptedFetcher {
    calls: AtomicUsize,
    responses: Mutex<VecDeque<Scripted>>,
    gate: Option<Semaphore>,
}

#[allow(dead_code)]
impl ScriptedFetcher {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            responses: Mutex::new(VecDeque::new()),
            gate: None,
        }
    }

    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new()
        }
    }

    pub fn push_ok(&self, response: ProfileResponse) {
        self.responses.lock().unwrap().push_back((Ok(response), None));
    }

    pub fn push_ok_after(&self, response: ProfileResponse, delay: Duration) {
        self.responses
            .lock()
            .unwrap()
            .push_back((Ok(response), Some(delay)));
    }

    pub fn push_err(&self, error: ProfileFetchError) {
        self.responses.lock().unwrap().push_back((Err(error), None));
    }

    /// Let `n` gated fetches complete.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ProfileFetcher for ScriptedFetcher {
    fn fetch_profile(
        &self,
    ) -> impl Future<Output = Result<ProfileResponse, ProfileFetchError>> + Send {
        async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.responses.lock().unwrap().pop_front();
            let (response, delay) = next.unwrap_or_else(|| {
                (
                    Err(ProfileFetchError::Network("no scripted response".into())),
                    None,
                )
            });

            if let Some(gate) = &self.gate {
                gate.acquire().await.expect("gate closed").forget();
            }
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            response
        }
    }
}

/// Payload of a signed-in user.
#[allow(dead_code)]
pub fn signed_in(user_id: &str, tiles: Option<&str>) -> ProfileResponse {
    ProfileResponse {
        authenticated: None,
        user: Some(UserProfile {
            id: Some(user_id.to_string()),
            name: Some("Test Rider".to_string()),
            ..Default::default()
        }),
        pmtiles_url: tiles.map(str::to_string),
    }
}

#[allow(dead_code)]
pub fn start_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-03-01T09:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// Cache over a scripted fetcher with a manual clock.
#[allow(dead_code)]
pub fn test_cache(fetcher: ScriptedFetcher) -> (SessionCache<ScriptedFetcher>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(start_time()));
    let cache = SessionCache::new(fetcher, API_URL).with_clock(clock.clone());
    (cache, clock)
}
