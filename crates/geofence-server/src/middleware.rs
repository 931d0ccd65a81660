use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, WWW_AUTHENTICATE},
        HeaderValue, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use geofence_core::AppConfig;
use serde::Serialize;
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// HTTP Basic auth that checks only the password. Any username is accepted.
#[derive(Clone)]
pub struct AuthState {
    password: Option<Arc<str>>,
}

impl AuthState {
    /// Reads `BASIC_AUTH_PASSWORD` from the loaded config.
    ///
    /// Development without a password runs open; every other environment
    /// refuses to start.
    ///
    /// # Errors
    ///
    /// Fails when no password is configured outside development.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        match config.basic_auth_password.as_deref().map(str::trim) {
            Some(password) if !password.is_empty() => Ok(Self::with_password(password)),
            _ if config.is_development() => {
                tracing::warn!("BASIC_AUTH_PASSWORD not set; auth disabled in development");
                Ok(Self::disabled())
            }
            _ => anyhow::bail!("BASIC_AUTH_PASSWORD is required outside development"),
        }
    }

    #[must_use]
    pub fn with_password(password: &str) -> Self {
        Self {
            password: Some(Arc::from(password)),
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self { password: None }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.password.is_some()
    }

    fn allows(&self, supplied: &str) -> bool {
        self.password
            .as_deref()
            .is_some_and(|expected| bool::from(supplied.as_bytes().ct_eq(expected.as_bytes())))
    }
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("enabled", &self.enabled())
            .finish()
    }
}

#[derive(Debug)]
struct RateLimitWindow {
    started_at: Instant,
    count: usize,
}

/// Fixed-window limiter shared by every protected route.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    state: Arc<Mutex<RateLimitWindow>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Arc::new(Mutex::new(RateLimitWindow {
                started_at: Instant::now(),
                count: 0,
            })),
        }
    }

    /// Counts one request; `false` once the current window is full.
    async fn admit(&self) -> bool {
        let mut window = self.state.lock().await;
        if window.started_at.elapsed() >= self.window {
            window.started_at = Instant::now();
            window.count = 0;
        }
        if window.count >= self.max_requests {
            return false;
        }
        window.count += 1;
        true
    }
}

#[derive(Debug, Serialize)]
struct RejectionBody {
    error: Rejection,
}

#[derive(Debug, Serialize)]
struct Rejection {
    code: &'static str,
    message: &'static str,
}

fn reject(status: StatusCode, code: &'static str, message: &'static str) -> Response {
    (
        status,
        Json(RejectionBody {
            error: Rejection { code, message },
        }),
    )
        .into_response()
}

/// Uses the caller's `x-request-id` when present, otherwise a fresh `UUIDv4`.
/// The id goes into request extensions as [`RequestId`] and is echoed on the
/// response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));
    let mut res = next.run(req).await;
    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, val);
    }
    res
}

/// Rejects requests whose Basic credentials do not carry the configured
/// password. Browsers get a `WWW-Authenticate` challenge so they prompt.
pub async fn require_basic_auth(State(auth): State<AuthState>, req: Request, next: Next) -> Response {
    if !auth.enabled() {
        return next.run(req).await;
    }

    let supplied = basic_password(req.headers().get(AUTHORIZATION));
    if supplied.as_deref().is_some_and(|p| auth.allows(p)) {
        return next.run(req).await;
    }

    tracing::debug!(path = %req.uri().path(), "rejected request without valid credentials");
    let mut res = reject(
        StatusCode::UNAUTHORIZED,
        "unauthorized",
        "authentication required",
    );
    res.headers_mut().insert(
        WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"Restricted\""),
    );
    res
}

pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    if !rate_limit.admit().await {
        return reject(
            StatusCode::TOO_MANY_REQUESTS,
            "rate_limited",
            "rate limit exceeded",
        );
    }
    next.run(req).await
}

/// Password from a `Basic` header: the text after the first `:` of the
/// decoded credentials, or all of it when there is no `:`.
fn basic_password(value: Option<&HeaderValue>) -> Option<String> {
    let encoded = value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Basic "))?
        .trim();
    let decoded = STANDARD.decode(encoded).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;
    let password = match credentials.split_once(':') {
        Some((_, password)) => password,
        None => credentials.as_str(),
    };
    Some(password.to_owned())
}
