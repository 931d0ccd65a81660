//! Full planning runs with export and delivery.

use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use geofence_core::Table;
use geofence_pipeline::{DeliveryReport, Links, PlanRequest};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{json_body, map_pipeline_error, ApiError, AppState};

#[derive(Debug, Serialize)]
pub(in crate::api) struct PlanResponse {
    pub preview: Table,
    pub links: Links,
    pub deliveries: Vec<DeliveryReport>,
}

/// POST /api/plan, answered with the bare `{preview, links, deliveries}`.
pub(in crate::api) async fn plan(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<PlanRequest>, JsonRejection>,
) -> Result<Json<PlanResponse>, ApiError> {
    let rid = &req_id.0;
    let request = json_body(rid, body)?;

    let outcome = state
        .planner
        .plan(&request)
        .await
        .map_err(|e| map_pipeline_error(rid, &e))?;

    Ok(Json(PlanResponse {
        preview: outcome.preview,
        links: outcome.links,
        deliveries: outcome.deliveries,
    }))
}
