//! CSV download of a table the client already holds.

use axum::{
    extract::rejection::JsonRejection,
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use geofence_core::Table;
use geofence_pipeline::to_csv_string;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{json_body, ApiError};

const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";
const CSV_DISPOSITION: &str = "attachment; filename=geofence_route.csv";

#[derive(Debug, Deserialize)]
pub(in crate::api) struct ExportRequest {
    pub table: Option<Table>,
}

/// POST /api/export
pub(in crate::api) async fn export_csv(
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<ExportRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let rid = &req_id.0;
    let table = json_body(rid, body)?
        .table
        .ok_or_else(|| ApiError::validation(rid, "table {headers, rows} is required"))?;
    if !table.is_rectangular() {
        return Err(ApiError::validation(
            rid,
            "every row must have one cell per header",
        ));
    }

    let csv = to_csv_string(&table).map_err(|e| {
        tracing::error!(error = %e, "csv serialization failed");
        ApiError::new(rid, "internal_error", "csv serialization failed")
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE),
            (header::CONTENT_DISPOSITION, CSV_DISPOSITION),
        ],
        csv,
    )
        .into_response())
}
