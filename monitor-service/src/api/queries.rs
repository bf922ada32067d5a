use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use energy_client::domain::{Block, Reading, Unit};
use serde::Deserialize;

use super::{ApiError, ApiState};
use crate::export::readings_to_csv;

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 1000;

// Rejections become `ApiError::BadRequest`.
type QueryParams<T> = Result<Query<T>, QueryRejection>;

#[derive(Debug, Default, Deserialize)]
pub struct DeviceFilter {
    pub device_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecentParams {
    pub device_id: Option<String>,
    pub limit: Option<i64>,
}

impl RecentParams {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

pub async fn health() -> &'static str {
    "ok"
}

/// `GET /api/readings/latest[?device_id=]`
pub async fn latest_reading(
    State(state): State<ApiState>,
    filter: QueryParams<DeviceFilter>,
) -> Result<Json<Vec<Reading>>, ApiError> {
    let Query(filter) = filter?;
    let latest = state.store.latest_reading(filter.device_id.as_deref()).await?;
    Ok(Json(latest.into_iter().collect()))
}

/// `GET /api/readings/latest-per-device`
pub async fn latest_per_device(State(state): State<ApiState>) -> Result<Json<Vec<Reading>>, ApiError> {
    Ok(Json(state.store.latest_per_device().await?))
}

/// `GET /api/readings[?device_id=&limit=]`
pub async fn recent_readings(
    State(state): State<ApiState>,
    params: QueryParams<RecentParams>,
) -> Result<Json<Vec<Reading>>, ApiError> {
    let Query(params) = params?;
    let rows = state
        .store
        .recent_readings(params.device_id.as_deref(), params.limit())
        .await?;
    Ok(Json(rows))
}

/// `GET /api/readings/export[?device_id=&limit=]`
pub async fn export_readings(
    State(state): State<ApiState>,
    params: QueryParams<RecentParams>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let rows = state
        .store
        .recent_readings(params.device_id.as_deref(), params.limit())
        .await?;
    let body = readings_to_csv(&rows)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"readings.csv\""),
        ],
        body,
    )
        .into_response())
}

pub async fn list_blocks(State(state): State<ApiState>) -> Result<Json<Vec<Block>>, ApiError> {
    Ok(Json(state.store.blocks().await?))
}

pub async fn list_units(State(state): State<ApiState>) -> Result<Json<Vec<Unit>>, ApiError> {
    Ok(Json(state.store.units(None).await?))
}

pub async fn list_block_units(
    State(state): State<ApiState>,
    block_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<Unit>>, ApiError> {
    let Path(block_id) = block_id?;
    Ok(Json(state.store.units(Some(block_id)).await?))
}
