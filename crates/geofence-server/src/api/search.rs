//! Interactive search: discover, filter and order stops around a map pin.

use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use geofence_core::{format_route, Coordinate, Origin, RouteList, Table};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{json_body, map_pipeline_error, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(in crate::api) struct SearchRequest {
    pub origin: Option<Coordinate>,
    pub radius_miles: Option<f64>,
    #[serde(default)]
    pub excluded_categories: Vec<String>,
    #[serde(default)]
    pub test_mode: bool,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct SearchResponse {
    pub route: RouteList,
    pub table: Table,
    pub count: usize,
}

/// POST /api/search. The body is the bare `{route, table, count}` object
/// the map client renders; errors still use the envelope.
pub(in crate::api) async fn search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let rid = &req_id.0;
    let body = json_body(rid, body)?;

    let origin = body
        .origin
        .filter(Coordinate::is_finite)
        .ok_or_else(|| ApiError::validation(rid, "origin {lat,lng} is required"))?;

    let route = state
        .planner
        .search(
            Origin::from(origin),
            body.radius_miles,
            &body.excluded_categories,
            body.test_mode,
        )
        .await
        .map_err(|e| map_pipeline_error(rid, &e))?;

    let table = format_route(&route);
    let count = route.stops.len();
    tracing::info!(request_id = %rid, count, "search complete");

    Ok(Json(SearchResponse {
        route,
        table,
        count,
    }))
}
