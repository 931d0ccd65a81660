use thiserror::Error;

/// Errors returned by the places, details, and directions providers.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx HTTP status.
    #[error("unexpected HTTP status {status} from {endpoint}")]
    UnexpectedStatus { status: u16, endpoint: String },

    /// The provider answered 2xx but its envelope `status` was not a success.
    #[error("{endpoint} returned {status}: {message}")]
    Api {
        endpoint: String,
        status: String,
        message: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The directions provider returned an order that is not a permutation
    /// of the submitted waypoints.
    #[error("invalid waypoint order {order:?} for {waypoints} waypoints")]
    InvalidWaypointOrder { order: Vec<usize>, waypoints: usize },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Fixture files are missing, unreadable, or exhausted.
    #[error("fixture error: {0}")]
    Fixture(String),
}

impl PlacesError {
    /// Provider statuses that describe a temporary condition on their side.
    #[must_use]
    pub fn is_transient_api_status(status: &str) -> bool {
        matches!(status, "OVER_QUERY_LIMIT" | "UNKNOWN_ERROR")
    }
}
