use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use parkon_core::CallerPrivilege;
use uuid::Uuid;

use crate::api::ApiError;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Maps bearer tokens to a [`CallerPrivilege`].
///
/// Tokens listed in `PARKON_REALTIME_KEYS` resolve to `realtime`, any other
/// token to `standard`, and a missing token to `anonymous`. Nothing is
/// rejected here; privilege only gates what a response contains.
#[derive(Debug, Clone, Default)]
pub struct PrivilegeState {
    realtime_keys: Arc<HashSet<String>>,
}

impl PrivilegeState {
    /// Builds the key set from `PARKON_REALTIME_KEYS` (comma-separated bearer tokens).
    #[must_use]
    pub fn from_env() -> Self {
        let state = Self::from_keys(&std::env::var("PARKON_REALTIME_KEYS").unwrap_or_default());
        if state.realtime_keys.is_empty() {
            tracing::warn!("PARKON_REALTIME_KEYS not set; live occupancy is never exposed");
        }
        state
    }

    #[must_use]
    pub fn from_keys(raw: &str) -> Self {
        let keys: HashSet<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect();
        Self {
            realtime_keys: Arc::new(keys),
        }
    }

    fn resolve(&self, token: Option<&str>) -> CallerPrivilege {
        match token {
            Some(token) if self.realtime_keys.contains(token) => CallerPrivilege::Realtime,
            Some(_) => CallerPrivilege::Standard,
            None => CallerPrivilege::Anonymous,
        }
    }
}

/// Fixed-window request counter shared by every caller.
#[derive(Debug)]
struct FixedWindow {
    opened: Instant,
    used: usize,
}

impl FixedWindow {
    /// Counts one request at `now`; `false` once the window is full.
    fn admit(&mut self, now: Instant, limit: usize, length: Duration) -> bool {
        if now.duration_since(self.opened) >= length {
            self.opened = now;
            self.used = 0;
        }
        if self.used >= limit {
            return false;
        }
        self.used += 1;
        true
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitState {
    limit: usize,
    length: Duration,
    window: Arc<Mutex<FixedWindow>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(limit: usize, length: Duration) -> Self {
        Self {
            limit,
            length,
            window: Arc::new(Mutex::new(FixedWindow {
                opened: Instant::now(),
                used: 0,
            })),
        }
    }

    fn admit(&self) -> bool {
        // A poisoned lock only means another request panicked mid-count.
        let mut window = self
            .window
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        window.admit(Instant::now(), self.limit, self.length)
    }
}

/// Reuses the caller's `x-request-id` or mints a `UUIDv4`, exposes it to
/// handlers as [`RequestId`], and echoes it on the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), ToOwned::to_owned);

    req.extensions_mut().insert(RequestId(id.clone()));
    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Middleware inserting the caller's [`CallerPrivilege`] as a request extension.
pub async fn resolve_privilege(
    State(privileges): State<PrivilegeState>,
    mut req: Request,
    next: Next,
) -> Response {
    let privilege = privileges.resolve(extract_bearer_token(req.headers().get(AUTHORIZATION)));
    req.extensions_mut().insert(privilege);
    next.run(req).await
}

/// Rejects requests with 429 once the shared window is exhausted.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    if rate_limit.admit() {
        return next.run(req).await;
    }

    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    tracing::debug!(request_id, "rate limit exceeded");
    ApiError::new(request_id, "rate_limited", "rate limit exceeded").into_response()
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
