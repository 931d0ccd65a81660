//! Opt-in exponential back-off for provider calls.
//!
//! Nothing in discovery or route ordering retries on its own. Callers either
//! wrap a single call in [`retry_with_backoff`] or wrap a whole provider in
//! [`Retrying`] so every call through the port gets the same policy.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use geofence_core::Coordinate;

use crate::error::PlacesError;
use crate::ports::{DirectionsProvider, EnrichmentProvider, PlacesProvider};
use crate::types::{NearbyPage, NearbyQuery, OptimizedRoute, PlaceContact};

const MAX_DELAY_MS: u64 = 60_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:**
/// - Network-level failures: timeout, connection refused or reset.
/// - HTTP 429 and 5xx.
/// - Provider envelope statuses `OVER_QUERY_LIMIT` and `UNKNOWN_ERROR`.
///
/// **Not retriable:** request denials, invalid requests, malformed bodies,
/// bad waypoint orders, bad configuration, and fixture errors.
#[must_use]
pub fn is_retriable(err: &PlacesError) -> bool {
    match err {
        PlacesError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(is_transient_http)
        }
        PlacesError::UnexpectedStatus { status, .. } => {
            reqwest::StatusCode::from_u16(*status).is_ok_and(is_transient_http)
        }
        PlacesError::Api { status, .. } => PlacesError::is_transient_api_status(status),
        PlacesError::Deserialize { .. }
        | PlacesError::InvalidWaypointOrder { .. }
        | PlacesError::InvalidBaseUrl { .. }
        | PlacesError::Fixture(_) => false,
    }
}

fn is_transient_http(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Delay before retry number `attempt` (1-based): `base_ms * 2^(attempt-1)`,
/// capped at 60 s.
#[must_use]
pub fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(16);
    let computed = base_ms.saturating_mul(1u64 << exponent);
    Duration::from_millis(computed.min(MAX_DELAY_MS))
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// Back-off schedule with `backoff_base_ms = 500`:
///
/// | Retry | Sleep before it |
/// |-------|-----------------|
/// | 1     | 500 ms          |
/// | 2     | 1 000 ms        |
/// | 3     | 2 000 ms        |
///
/// Non-retriable errors are returned immediately.
///
/// # Errors
///
/// Returns the last error once it is non-retriable or the retries run out.
pub async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, PlacesError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PlacesError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay = backoff_delay(backoff_base_ms, attempt);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(MAX_DELAY_MS),
                    error = %err,
                    "transient provider error, retrying after back-off"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Retry budget shared by every call through a [`Retrying`] provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_retries: u32, backoff_base_ms: u64) -> Self {
        Self {
            max_retries,
            backoff_base_ms,
        }
    }

    /// A policy that never retries.
    #[must_use]
    pub fn none() -> Self {
        Self::new(0, 0)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, 500)
    }
}

/// Wraps any provider so each port call goes through [`retry_with_backoff`].
pub struct Retrying<P> {
    inner: P,
    policy: RetryPolicy,
}

impl<P> Retrying<P> {
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: PlacesProvider> PlacesProvider for Retrying<P> {
    async fn nearby_page(&self, query: &NearbyQuery) -> Result<NearbyPage, PlacesError> {
        retry_with_backoff(self.policy.max_retries, self.policy.backoff_base_ms, || {
            self.inner.nearby_page(query)
        })
        .await
    }
}

#[async_trait]
impl<P: DirectionsProvider> DirectionsProvider for Retrying<P> {
    async fn optimize_round_trip(
        &self,
        origin: Coordinate,
        waypoints: &[Coordinate],
    ) -> Result<OptimizedRoute, PlacesError> {
        retry_with_backoff(self.policy.max_retries, self.policy.backoff_base_ms, || {
            self.inner.optimize_round_trip(origin, waypoints)
        })
        .await
    }
}

#[async_trait]
impl<P: EnrichmentProvider> EnrichmentProvider for Retrying<P> {
    async fn place_contact(&self, place_id: &str) -> Result<PlaceContact, PlacesError> {
        retry_with_backoff(self.policy.max_retries, self.policy.backoff_base_ms, || {
            self.inner.place_contact(place_id)
        })
        .await
    }
}
