//! Directions endpoint with waypoint optimization.

use async_trait::async_trait;
use geofence_core::Coordinate;

use super::GoogleMapsClient;
use crate::error::PlacesError;
use crate::ports::DirectionsProvider;
use crate::types::{DirectionsLeg, DirectionsResponse, LegSummary, OptimizedRoute};

const ENDPOINT: &str = "directions/json";

#[async_trait]
impl DirectionsProvider for GoogleMapsClient {
    /// Requests a driving round trip that leaves now, so the provider prices
    /// legs with live traffic.
    ///
    /// A `ZERO_RESULTS` answer carries no routes and becomes an identity
    /// order with no legs.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Http`] on network failure.
    /// - [`PlacesError::UnexpectedStatus`] on a non-2xx HTTP status.
    /// - [`PlacesError::Api`] for any other envelope status.
    /// - [`PlacesError::Deserialize`] if the body does not match the expected shape.
    async fn optimize_round_trip(
        &self,
        origin: Coordinate,
        waypoints: &[Coordinate],
    ) -> Result<OptimizedRoute, PlacesError> {
        let origin = origin.to_string();
        let waypoints = waypoints_param(waypoints);
        let params = [
            ("origin", origin.as_str()),
            ("destination", origin.as_str()),
            ("waypoints", waypoints.as_str()),
            ("mode", "driving"),
            ("departure_time", "now"),
        ];

        let url = self.build_url(ENDPOINT, &params)?;
        let body: DirectionsResponse = self.get_json(url, ENDPOINT).await?;
        Self::check_status(ENDPOINT, &body.status, body.error_message.as_deref())?;

        if body.routes.is_empty() {
            tracing::warn!(status = %body.status, "directions returned no routes");
        }
        Ok(optimized_from_response(body))
    }
}

/// First route's order and legs; no route means identity order, no legs.
pub(crate) fn optimized_from_response(body: DirectionsResponse) -> OptimizedRoute {
    let Some(route) = body.routes.into_iter().next() else {
        return OptimizedRoute::default();
    };
    OptimizedRoute {
        waypoint_order: route.waypoint_order,
        legs: route.legs.iter().map(leg_summary).collect(),
    }
}

/// `optimize:true|lat,lng|lat,lng|...`
fn waypoints_param(waypoints: &[Coordinate]) -> String {
    let mut param = String::from("optimize:true");
    for w in waypoints {
        param.push('|');
        param.push_str(&w.to_string());
    }
    param
}

/// Traffic-aware duration when the provider priced it, plain duration otherwise.
fn leg_summary(leg: &DirectionsLeg) -> LegSummary {
    LegSummary {
        distance_meters: leg.distance.as_ref().map(|d| d.value),
        duration_seconds: leg
            .duration_in_traffic
            .as_ref()
            .or(leg.duration.as_ref())
            .map(|d| d.value),
    }
}
