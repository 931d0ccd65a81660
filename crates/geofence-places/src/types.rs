//! Provider request/response shapes.
//!
//! The `*Response` structs mirror the Google Maps web-service JSON. Every
//! field the pipeline can live without is optional with `#[serde(default)]`:
//!
//! - `results[].types` is omitted for some places; treated as `[]`.
//! - `formatted_address` is only present on text search results; nearby
//!   search usually carries `vicinity` instead.
//! - `next_page_token` is absent on the last page.
//! - `routes[].waypoint_order` is absent when no waypoints were optimized.
//! - `legs[].distance` / `legs[].duration` may be missing on partial routes.
//!
//! The port-level types ([`NearbyQuery`], [`NearbyPage`], [`OptimizedRoute`],
//! [`PlaceContact`]) are what providers hand back to the pipeline.

use geofence_core::{BusinessRecord, Coordinate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct NearbySearchResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<PlaceResult>,
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaceResult {
    pub place_id: String,
    pub name: String,
    #[serde(default)]
    pub vicinity: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    pub geometry: Geometry,
    #[serde(default)]
    pub types: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Geometry {
    pub location: Coordinate,
}

#[derive(Debug, Deserialize)]
pub struct PlaceDetailsResponse {
    pub status: String,
    #[serde(default)]
    pub result: Option<PlaceContact>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DirectionsResponse {
    pub status: String,
    #[serde(default)]
    pub routes: Vec<DirectionsRoute>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DirectionsRoute {
    #[serde(default)]
    pub waypoint_order: Option<Vec<usize>>,
    #[serde(default)]
    pub legs: Vec<DirectionsLeg>,
}

#[derive(Debug, Deserialize)]
pub struct DirectionsLeg {
    #[serde(default)]
    pub distance: Option<ValueField>,
    #[serde(default)]
    pub duration: Option<ValueField>,
    #[serde(default)]
    pub duration_in_traffic: Option<ValueField>,
}

/// `{ "text": "1.2 km", "value": 1200 }`; only the numeric part is used.
#[derive(Debug, Deserialize)]
pub struct ValueField {
    pub value: u64,
}

/// One nearby-search request.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyQuery {
    pub location: Coordinate,
    pub radius_meters: u32,
    pub type_hint: Option<String>,
    pub page_token: Option<String>,
}

/// One page of discovered businesses plus the token for the next page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NearbyPage {
    pub results: Vec<BusinessRecord>,
    pub next_page_token: Option<String>,
}

/// Contact details returned by the place details endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PlaceContact {
    #[serde(default)]
    pub formatted_phone_number: Option<String>,
    #[serde(default)]
    pub international_phone_number: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

/// Per-leg figures as reported. `None` means the provider omitted the field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LegSummary {
    pub distance_meters: Option<u64>,
    pub duration_seconds: Option<u64>,
}

/// What the directions provider decided for a round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptimizedRoute {
    /// Optimized position → submitted waypoint index. `None` means identity.
    pub waypoint_order: Option<Vec<usize>>,
    pub legs: Vec<LegSummary>,
}
