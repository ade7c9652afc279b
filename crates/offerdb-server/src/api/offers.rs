use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{
    map_db_error, normalize_limit, parse_region, ApiError, ApiResponse, AppState, ResponseMeta,
};

#[derive(Debug, Serialize)]
pub(super) struct OfferItem {
    region_code: String,
    offer_id: String,
    model_year: String,
    start_date: String,
    end_date: String,
    is_featured: bool,
    sales_program_name: String,
    sales_program_type: String,
    model_group_name: String,
    photo_url: String,
    description: String,
    series_item_name: String,
    tab: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OfferQuery {
    pub region_code: Option<String>,
    pub tab: Option<String>,
    pub sales_program_type: Option<String>,
    pub model_year: Option<String>,
    pub limit: Option<i64>,
}

pub(super) async fn list_offers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<OfferQuery>,
) -> Result<Json<ApiResponse<Vec<OfferItem>>>, ApiError> {
    let region_code = query
        .region_code
        .as_deref()
        .map(|raw| parse_region(&req_id.0, raw))
        .transpose()?;

    let rows = offerdb_db::list_offers(
        &state.pool,
        &offerdb_db::OfferFilter {
            region_code,
            tab: query.tab,
            sales_program_type: query.sales_program_type,
            model_year: query.model_year,
            limit: Some(normalize_limit(query.limit)),
        },
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| OfferItem {
            region_code: row.region_code,
            offer_id: row.offer_id,
            model_year: row.model_year,
            start_date: row.start_date,
            end_date: row.end_date,
            is_featured: row.is_featured,
            sales_program_name: row.sales_program_name,
            sales_program_type: row.sales_program_type,
            model_group_name: row.model_group_name,
            photo_url: row.photo_url,
            description: row.description,
            series_item_name: row.series_item_name,
            tab: row.tab,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
