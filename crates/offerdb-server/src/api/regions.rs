//! Region-code registry handlers.
//!
//! - `GET    /api/v1/regions`        list registered codes
//! - `POST   /api/v1/regions`        register a code
//! - `GET    /api/v1/regions/{code}` one code
//! - `PUT    /api/v1/regions/{code}` rename a code
//! - `DELETE /api/v1/regions/{code}` remove a code

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, parse_region, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct RegionItem {
    pub id: i64,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RegionRequest {
    pub code: String,
}

impl From<offerdb_db::RegionCodeRow> for RegionItem {
    fn from(row: offerdb_db::RegionCodeRow) -> Self {
        Self {
            id: row.id,
            code: row.code,
            created_at: row.created_at,
        }
    }
}

pub(super) async fn list_regions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<RegionItem>>>, ApiError> {
    let rows = offerdb_db::list_region_codes(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(RegionItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn create_region(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<RegionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegionItem>>), ApiError> {
    let rid = &req_id.0;
    let code = parse_region(rid, &body.code)?;

    let row = offerdb_db::create_region_code(&state.pool, &code)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    tracing::info!(region = %code, "region registered");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: row.into(),
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn get_region(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(code): Path<String>,
) -> Result<Json<ApiResponse<RegionItem>>, ApiError> {
    let rid = &req_id.0;
    let code = parse_region(rid, &code)?;

    let row = offerdb_db::get_region_code(&state.pool, &code)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .ok_or_else(|| ApiError::new(rid, "not_found", format!("region '{code}' not found")))?;

    Ok(Json(ApiResponse {
        data: row.into(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Renames the code in place. Stored offers and markers keep the old code.
pub(super) async fn rename_region(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(code): Path<String>,
    Json(body): Json<RegionRequest>,
) -> Result<Json<ApiResponse<RegionItem>>, ApiError> {
    let rid = &req_id.0;
    let from = parse_region(rid, &code)?;
    let to = parse_region(rid, &body.code)?;

    let row = offerdb_db::rename_region_code(&state.pool, &from, &to)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    tracing::info!(from = %from, to = %to, "region renamed");

    Ok(Json(ApiResponse {
        data: row.into(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn delete_region(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(code): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let code = parse_region(rid, &code)?;

    offerdb_db::delete_region_code(&state.pool, &code)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    tracing::info!(region = %code, "region removed");

    Ok(Json(ApiResponse {
        data: serde_json::json!({ "deleted": true }),
        meta: ResponseMeta::new(req_id.0),
    }))
}
