//! HTTP client for the Google Maps web services.
//!
//! One client type serves nearby search, place details, and directions. Each
//! instance carries a single API key, so the places and directions keys get
//! separate instances. Every endpoint checks the `"status"` field in the JSON
//! envelope and surfaces failures as [`PlacesError::Api`].

mod details;
mod directions;
mod nearby;

pub(crate) use directions::optimized_from_response;
pub use nearby::{place_to_record, UNKNOWN_CATEGORY};

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::PlacesError;

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/";

/// Delay before a `pagetoken` request. Google rejects tokens used before
/// they become valid with `INVALID_REQUEST`.
const DEFAULT_PAGE_TOKEN_DELAY: Duration = Duration::from_secs(2);

/// Envelope statuses that mean "the call worked".
const SUCCESS_STATUSES: [&str; 2] = ["OK", "ZERO_RESULTS"];

/// Client for the Google Maps places, details, and directions endpoints.
///
/// Use [`GoogleMapsClient::new`] for production or
/// [`GoogleMapsClient::with_base_url`] to point at a mock server in tests.
pub struct GoogleMapsClient {
    client: Client,
    api_key: String,
    base_url: Url,
    page_token_delay: Duration,
}

impl GoogleMapsClient {
    /// Creates a new client pointed at the production Google Maps API.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("geofence-route/0.1")
            .build()?;

        // Exactly one trailing slash so `Url::join` appends endpoint paths
        // instead of replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| PlacesError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            page_token_delay: DEFAULT_PAGE_TOKEN_DELAY,
        })
    }

    /// Overrides the wait applied before requesting a follow-up page.
    #[must_use]
    pub fn with_page_token_delay(mut self, delay: Duration) -> Self {
        self.page_token_delay = delay;
        self
    }

    /// Builds the endpoint URL with percent-encoded query parameters and the
    /// API key appended last.
    fn build_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url, PlacesError> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|e| PlacesError::InvalidBaseUrl {
                url: format!("{}{endpoint}", self.base_url),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    /// Sends a GET, asserts a 2xx status, and deserializes the body.
    ///
    /// `endpoint` is used for error context instead of the full URL so the
    /// API key never ends up in an error message or log line.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        endpoint: &str,
    ) -> Result<T, PlacesError> {
        // reqwest errors print their URL, which carries the key.
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PlacesError::Http(e.without_url()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(PlacesError::UnexpectedStatus {
                status: status.as_u16(),
                endpoint: endpoint.to_owned(),
            });
        }
        let body = response
            .text()
            .await
            .map_err(|e| PlacesError::Http(e.without_url()))?;
        serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
            context: endpoint.to_owned(),
            source: e,
        })
    }

    /// Maps a non-success envelope status to [`PlacesError::Api`].
    fn check_status(
        endpoint: &str,
        status: &str,
        error_message: Option<&str>,
    ) -> Result<(), PlacesError> {
        if SUCCESS_STATUSES.contains(&status) {
            return Ok(());
        }
        Err(PlacesError::Api {
            endpoint: endpoint.to_owned(),
            status: status.to_owned(),
            message: error_message.unwrap_or("no error message").to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> GoogleMapsClient {
        GoogleMapsClient::with_base_url("test-key", 30, base_url)
            .expect("client construction should not fail")
    }

    #[test]
    fn build_url_appends_endpoint_and_key() {
        let client = test_client("https://maps.googleapis.com/maps/api");
        let url = client
            .build_url("place/details/json", &[("place_id", "abc")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://maps.googleapis.com/maps/api/place/details/json?place_id=abc&key=test-key"
        );
    }

    #[test]
    fn build_url_strips_trailing_slash() {
        let client = test_client("https://maps.googleapis.com/maps/api///");
        let url = client.build_url("directions/json", &[]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://maps.googleapis.com/maps/api/directions/json?key=test-key"
        );
    }

    #[test]
    fn build_url_encodes_waypoint_separators() {
        let client = test_client("https://maps.googleapis.com/maps/api");
        let url = client
            .build_url("directions/json", &[("waypoints", "optimize:true|1,2|3,4")])
            .unwrap();
        assert!(
            url.as_str().contains("optimize%3Atrue%7C1%2C2%7C3%2C4"),
            "waypoints should be percent-encoded: {url}"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = GoogleMapsClient::with_base_url("k", 5, "not a url");
        assert!(matches!(result, Err(PlacesError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn check_status_accepts_ok_and_zero_results() {
        assert!(GoogleMapsClient::check_status("x", "OK", None).is_ok());
        assert!(GoogleMapsClient::check_status("x", "ZERO_RESULTS", None).is_ok());
    }

    #[test]
    fn check_status_reports_denied_requests() {
        let err = GoogleMapsClient::check_status(
            "place/nearbysearch/json",
            "REQUEST_DENIED",
            Some("The provided API key is invalid."),
        )
        .unwrap_err();
        match err {
            PlacesError::Api {
                endpoint,
                status,
                message,
            } => {
                assert_eq!(endpoint, "place/nearbysearch/json");
                assert_eq!(status, "REQUEST_DENIED");
                assert_eq!(message, "The provided API key is invalid.");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
