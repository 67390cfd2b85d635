use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, middleware::auth::AuthUser, AppState};

// Don't let the window table grow without bound under address churn.
const PRUNE_THRESHOLD: usize = 1024;

/// Fixed-window admission gate. Check and increment happen under one lock
/// acquisition, so two concurrent requests cannot both slip past the
/// boundary count.
#[derive(Clone)]
pub struct RateLimiter {
    windows: Arc<Mutex<HashMap<String, Window>>>,
    max_requests: u32,
    window: Duration,
}

struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Decision {
    Admit,
    Deny,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: Arc::new(Mutex::new(HashMap::new())),
            max_requests,
            window,
        }
    }

    pub fn hit(&self, key: &str) -> Result<Decision, AppError> {
        self.hit_at(key, Instant::now())
    }

    fn hit_at(&self, key: &str, now: Instant) -> Result<Decision, AppError> {
        // A poisoned lock means the limiter state is unknown; surface it
        // instead of silently admitting or rejecting.
        let mut windows = self
            .windows
            .lock()
            .map_err(|_| AppError::Internal("rate limiter state unavailable".to_string()))?;

        if windows.len() > PRUNE_THRESHOLD {
            let window = self.window;
            windows.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }

        if entry.count >= self.max_requests {
            return Ok(Decision::Deny);
        }

        entry.count += 1;
        Ok(Decision::Admit)
    }
}

/// Admission middleware for the abuse-prone routes. Keys by user id when the
/// request has already been authenticated, otherwise by client address.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = match request.extensions().get::<AuthUser>() {
        Some(user) => user.id.clone(),
        None => client_key(&request, state.config.trust_proxy),
    };

    match state.limiter.hit(&key)? {
        Decision::Admit => Ok(next.run(request).await),
        Decision::Deny => {
            tracing::warn!(%key, "rate limit exceeded");
            Err(AppError::RateLimited)
        }
    }
}

// The forwarded header is only meaningful behind a proxy we control; a
// direct client could rotate it freely to dodge the quota.
fn client_key(request: &Request, trust_proxy: bool) -> String {
    if trust_proxy {
        if let Some(forwarded) = request
            .headers()
            .get("x-forwarded-for")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.split(',').next())
        {
            return forwarded.trim().to_string();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "anonymous".to_string())
}
