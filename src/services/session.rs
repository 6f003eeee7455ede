// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication session cache.
//!
//! Single source of truth for "is the user signed in, and where is their
//! tile archive". Results of the profile fetch, successful or not, are
//! cached for a TTL. Concurrent checks share one in-flight fetch, and a
//! logout bumps an epoch so that fetches started before it cannot bring the
//! session back. Every published check bumps a generation, so a background
//! refresh that lands after a newer check is dropped.

use crate::config::DEFAULT_AUTH_TTL_SECS;
use crate::error::ProfileFetchError;
use crate::models::{ProfileResponse, SourceDescriptor, UserProfile};
use crate::services::api::ProfileFetcher;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Message stored on sessions whose check failed.
pub const AUTH_FAILED_MESSAGE: &str = "Authentication failed";

/// Key of the persisted auth hint removed on logout.
pub const AUTH_HINT_KEY: &str = "ridelines_auth_state";

// ─────────────────────────────────────────────────────────────────────────────
// Collaborators
// ─────────────────────────────────────────────────────────────────────────────

/// Source of "now" for cache expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Persisted client-side auth hints (the browser's local storage).
pub trait HintStore: Send + Sync {
    fn remove(&self, key: &str);
}

/// In-memory `HintStore`.
#[derive(Debug, Default)]
pub struct MemoryHintStore {
    entries: DashMap<String, String>,
}

impl MemoryHintStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }
}

impl HintStore for MemoryHintStore {
    fn remove(&self, key: &str) {
        self.entries.remove(key);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session state
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of an authentication check, as cached.
///
/// `authenticated` implies `profile` is present, and `tile_resource_url` is
/// only ever set on authenticated sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub authenticated: bool,
    pub profile: Option<UserProfile>,
    pub tile_resource_url: Option<String>,
    pub error: Option<String>,
    pub cached_at: DateTime<Utc>,
    /// Zero for the empty session, which is therefore never fresh.
    pub ttl: Duration,
}

impl Default for AuthSession {
    /// The empty, unauthenticated session.
    fn default() -> Self {
        Self {
            authenticated: false,
            profile: None,
            tile_resource_url: None,
            error: None,
            cached_at: DateTime::<Utc>::default(),
            ttl: Duration::zero(),
        }
    }
}

impl AuthSession {
    /// Session for a signed-in user.
    pub fn authenticated(
        profile: UserProfile,
        tile_resource_url: Option<String>,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            authenticated: true,
            profile: Some(profile),
            tile_resource_url,
            error: None,
            cached_at: now,
            ttl,
        }
    }

    /// Session for a failed check.
    pub fn failed(now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            authenticated: false,
            profile: None,
            tile_resource_url: None,
            error: Some(AUTH_FAILED_MESSAGE.to_string()),
            cached_at: now,
            ttl,
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.cached_at + self.ttl
    }

    /// A cached session may be served iff `now < cached_at + ttl`.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at()
    }

    fn from_fetch(
        result: Result<ProfileResponse, ProfileFetchError>,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        match result {
            Ok(response) if response.is_authenticated() => {
                let tile_resource_url = response.tile_resource_url().map(str::to_string);
                let profile = response.user.unwrap_or_default();
                tracing::info!(
                    user_id = ?profile.id,
                    has_tiles = tile_resource_url.is_some(),
                    "Authentication check succeeded"
                );
                Self::authenticated(profile, tile_resource_url, now, ttl)
            }
            Ok(_) => {
                tracing::warn!(
                    kind = ProfileFetchError::Unauthenticated.kind(),
                    "Profile response carried no authenticated user"
                );
                Self::failed(now, ttl)
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = e.kind(), "Authentication check failed");
                Self::failed(now, ttl)
            }
        }
    }
}

/// Observable state of the cache: the session plus derived signals.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    pub session: AuthSession,
    /// A check or refresh is in flight
    pub loading: bool,
    /// Derived: map data may be loaded. Kept current by `recompute`.
    pub data_ready: bool,
}

impl SessionState {
    /// Recompute derived fields. Must run after every mutation.
    pub fn recompute(&mut self) {
        self.data_ready = self.session.authenticated
            && self
                .session
                .tile_resource_url
                .as_deref()
                .is_some_and(|url| !url.is_empty())
            && !self.loading;
    }

    /// Vector source for the user's tile archive, once known.
    pub fn vector_source(&self) -> Option<SourceDescriptor> {
        if !self.session.authenticated {
            return None;
        }
        self.session
            .tile_resource_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .map(SourceDescriptor::pmtiles)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SessionCache
// ─────────────────────────────────────────────────────────────────────────────

type PendingCheck = Shared<BoxFuture<'static, AuthSession>>;

struct Inner {
    state: SessionState,
    /// The in-flight check, shared by every caller that arrives meanwhile.
    pending: Option<PendingCheck>,
    refreshes_in_flight: usize,
    /// Incremented on logout; results from an older epoch are dropped.
    epoch: u64,
    /// Incremented whenever a check publishes a session.
    generation: u64,
}

impl Inner {
    fn sync(&mut self) {
        self.state.loading = self.pending.is_some() || self.refreshes_in_flight > 0;
        self.state.recompute();
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Authentication cache over a profile fetch capability.
///
/// Construct one per UI session (or per test); clones share state.
pub struct SessionCache<F> {
    fetcher: Arc<F>,
    inner: Arc<Mutex<Inner>>,
    clock: Arc<dyn Clock>,
    hints: Option<Arc<dyn HintStore>>,
    ttl: Duration,
    api_url: String,
}

impl<F> Clone for SessionCache<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            inner: Arc::clone(&self.inner),
            clock: Arc::clone(&self.clock),
            hints: self.hints.clone(),
            ttl: self.ttl,
            api_url: self.api_url.clone(),
        }
    }
}

impl<F: ProfileFetcher> SessionCache<F> {
    /// Create an empty cache. `api_url` is used for login redirects.
    pub fn new(fetcher: F, api_url: &str) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            inner: Arc::new(Mutex::new(Inner {
                state: SessionState::default(),
                pending: None,
                refreshes_in_flight: 0,
                epoch: 0,
                generation: 0,
            })),
            clock: Arc::new(SystemClock),
            hints: None,
            ttl: Duration::seconds(DEFAULT_AUTH_TTL_SECS),
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_hint_store(mut self, hints: Arc<dyn HintStore>) -> Self {
        self.hints = Some(hints);
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    // ─── Authentication check ────────────────────────────────────────────────

    /// Check authentication, serving the cached session while it is fresh.
    ///
    /// At most one fetch is in flight per cache; callers arriving while one
    /// is pending get its result. Never fails: failures come back as an
    /// unauthenticated session with `error` set, and are cached too.
    pub async fn check_authentication(&self) -> AuthSession {
        let pending = {
            let mut inner = lock(&self.inner);
            if inner.state.session.is_fresh(self.clock.now()) {
                return inner.state.session.clone();
            }

            if let Some(pending) = inner.pending.clone() {
                tracing::debug!("Joining in-flight authentication check");
                pending
            } else {
                let pending = self.start_check(inner.epoch);
                inner.pending = Some(pending.clone());
                inner.sync();
                pending
            }
        };

        pending.await
    }

    /// Spawn the fetch for `epoch` and return a shareable handle to it.
    ///
    /// The fetch runs as its own task, so it completes and publishes its
    /// result even if every caller waiting on it is dropped. Must be called
    /// from within a Tokio runtime.
    fn start_check(&self, epoch: u64) -> PendingCheck {
        let fetcher = Arc::clone(&self.fetcher);
        let inner = Arc::clone(&self.inner);
        let clock = Arc::clone(&self.clock);
        let ttl = self.ttl;

        let task = tokio::spawn(async move {
            let result = fetcher.fetch_profile().await;
            let session = AuthSession::from_fetch(result, clock.now(), ttl);
            publish_check(&inner, epoch, session)
        });

        let inner = Arc::clone(&self.inner);
        let clock = Arc::clone(&self.clock);
        async move {
            match task.await {
                Ok(session) => session,
                Err(e) => {
                    tracing::error!(error = %e, "Authentication check task failed");
                    publish_check(&inner, epoch, AuthSession::failed(clock.now(), ttl))
                }
            }
        }
        .boxed()
        .shared()
    }

    // ─── Background refresh ──────────────────────────────────────────────────

    /// Re-fetch the profile and tile URL of a signed-in user.
    ///
    /// Updates `profile` and `tile_resource_url` in place; `authenticated`
    /// and `cached_at` are left alone. Failures are logged and otherwise
    /// ignored. Does nothing when not authenticated.
    pub async fn refresh_user(&self) {
        let (epoch, generation, _in_flight) = {
            let mut inner = lock(&self.inner);
            if !inner.state.session.authenticated {
                return;
            }
            inner.refreshes_in_flight += 1;
            inner.sync();
            (
                inner.epoch,
                inner.generation,
                RefreshInFlight { inner: &self.inner },
            )
        };

        let result = self.fetcher.fetch_profile().await;

        let mut inner = lock(&self.inner);
        if inner.epoch != epoch || !inner.state.session.authenticated {
            tracing::debug!("Discarding profile refresh from before logout");
            return;
        }
        if inner.generation != generation {
            tracing::debug!("Discarding profile refresh superseded by a newer check");
            return;
        }

        match result {
            Ok(response) if response.is_authenticated() => {
                let tile_resource_url = response.tile_resource_url().map(str::to_string);
                inner.state.session.profile = response.user;
                inner.state.session.tile_resource_url = tile_resource_url;
                tracing::debug!("User profile refreshed");
            }
            Ok(_) => {
                tracing::warn!("Profile refresh returned no user, keeping cached profile");
            }
            Err(e) => {
                tracing::error!(error = %e, kind = e.kind(), "Failed to refresh user data");
            }
        }
        inner.sync();
    }

    // ─── Logout & login ──────────────────────────────────────────────────────

    /// Clear the session immediately, regardless of TTL.
    ///
    /// Any in-flight check is detached: its result is discarded on arrival.
    pub fn logout(&self) {
        {
            let mut inner = lock(&self.inner);
            inner.epoch = inner.epoch.wrapping_add(1);
            inner.pending = None;
            inner.state.session = AuthSession::default();
            inner.sync();
        }

        if let Some(hints) = &self.hints {
            hints.remove(AUTH_HINT_KEY);
        }
        tracing::info!("Session cleared");
    }

    /// Login entry URL that returns the user to `path` afterwards.
    pub fn login_redirect_target(&self, path: &str) -> String {
        login_redirect_target(&self.api_url, path)
    }

    // ─── Observers ───────────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        lock(&self.inner).state.clone()
    }

    pub fn session(&self) -> AuthSession {
        lock(&self.inner).state.session.clone()
    }

    /// True iff signed in, a tile URL is known, and nothing is in flight.
    pub fn is_data_ready(&self) -> bool {
        lock(&self.inner).state.data_ready
    }

    pub fn vector_source(&self) -> Option<SourceDescriptor> {
        lock(&self.inner).state.vector_source()
    }
}

/// Publish the outcome of a check started in `epoch`.
///
/// Returns what callers of that check should see: the new session, or the
/// current one if a logout happened meanwhile.
fn publish_check(inner: &Mutex<Inner>, epoch: u64, session: AuthSession) -> AuthSession {
    let mut inner = lock(inner);
    if inner.epoch != epoch {
        tracing::info!("Discarding authentication result from before logout");
        return inner.state.session.clone();
    }

    inner.pending = None;
    inner.generation = inner.generation.wrapping_add(1);
    inner.state.session = session.clone();
    inner.sync();
    session
}

/// Decrements the refresh counter when a refresh ends, however it ends.
struct RefreshInFlight<'a> {
    inner: &'a Mutex<Inner>,
}

impl Drop for RefreshInFlight<'_> {
    fn drop(&mut self) {
        let mut inner = lock(self.inner);
        inner.refreshes_in_flight = inner.refreshes_in_flight.saturating_sub(1);
        inner.sync();
    }
}

/// `{api_url}/auth/login`, with `redirect_path` when `path` is not the root.
pub fn login_redirect_target(api_url: &str, path: &str) -> String {
    let base = format!("{}/auth/login", api_url.trim_end_matches('/'));
    if path.is_empty() || path == "/" {
        return base;
    }
    format!("{}?redirect_path={}", base, urlencoding::encode(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn profile() -> UserProfile {
        UserProfile {
            id: Some("u1".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_session_is_never_fresh() {
        let session = AuthSession::default();
        assert!(!session.is_fresh(now()));
        assert!(!session.authenticated);
    }

    #[test]
    fn test_freshness_boundary() {
        let session = AuthSession::failed(now(), Duration::minutes(5));
        assert!(session.is_fresh(now() + Duration::seconds(299)));
        assert!(!session.is_fresh(now() + Duration::minutes(5)));
        assert_eq!(session.error.as_deref(), Some(AUTH_FAILED_MESSAGE));
    }

    #[test]
    fn test_recompute_requires_tile_url_and_idle() {
        let mut state = SessionState {
            session: AuthSession::authenticated(
                profile(),
                Some("https://tiles/u1.pmtiles".to_string()),
                now(),
                Duration::minutes(5),
            ),
            loading: true,
            data_ready: false,
        };
        state.recompute();
        assert!(!state.data_ready);

        state.loading = false;
        state.recompute();
        assert!(state.data_ready);

        state.session.tile_resource_url = Some(String::new());
        state.recompute();
        assert!(!state.data_ready);
    }

    #[test]
    fn test_recompute_unauthenticated_never_ready() {
        let mut state = SessionState::default();
        state.session.tile_resource_url = Some("https://tiles/x".to_string());
        state.recompute();
        assert!(!state.data_ready);
        assert_eq!(state.vector_source(), None);
    }

    #[test]
    fn test_from_fetch_collapses_errors() {
        let session = AuthSession::from_fetch(
            Err(ProfileFetchError::MalformedPayload("eof".to_string())),
            now(),
            Duration::minutes(5),
        );
        assert!(!session.authenticated);
        assert!(session.profile.is_none());
        assert_eq!(session.cached_at, now());
    }

    #[test]
    fn test_login_redirect_root_has_no_query() {
        assert_eq!(
            login_redirect_target("https://api.example.com/", "/"),
            "https://api.example.com/auth/login"
        );
        assert_eq!(
            login_redirect_target("https://api.example.com", ""),
            "https://api.example.com/auth/login"
        );
    }

    #[test]
    fn test_login_redirect_encodes_path() {
        assert_eq!(
            login_redirect_target("/api", "/map?style=dark"),
            "/api/auth/login?redirect_path=%2Fmap%3Fstyle%3Ddark"
        );
    }

    #[test]
    fn test_memory_hint_store_remove() {
        let store = MemoryHintStore::new();
        store.set(AUTH_HINT_KEY, "1");
        assert_eq!(store.get(AUTH_HINT_KEY).as_deref(), Some("1"));
        store.remove(AUTH_HINT_KEY);
        assert_eq!(store.get(AUTH_HINT_KEY), None);
    }
}
