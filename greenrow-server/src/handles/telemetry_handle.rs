use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use greenrow_api::RowId;
use serde::{Deserialize, Serialize};

use crate::errors::{ApiError, RequestError};
use crate::services::{IngestService, PersistenceGateway};

const DEFAULT_TELEMETRY_LIMIT: i64 = 100;

#[derive(Clone, Serialize, Deserialize)]
pub struct TelemetryQuery {
    pub limit: Option<i64>,
}

#[derive(Clone)]
pub struct TelemetryState {
    pub ingest_service: Arc<IngestService>,
    pub gateway: Arc<dyn PersistenceGateway>,
}

/// Device upload. The stored frame is echoed back as acknowledgement.
pub async fn put_telemetry(
    State(state): State<TelemetryState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    state.ingest_service.ingest(&body).await?;

    Ok(body)
}

pub async fn get_row_telemetry(
    Path(row_id): Path<RowId>,
    Query(query): Query<TelemetryQuery>,
    State(state): State<TelemetryState>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_TELEMETRY_LIMIT);
    if limit <= 0 {
        return Err(RequestError::InvalidLimit.into());
    }

    let records = state.gateway.recent_telemetry(row_id, limit).await?;

    Ok(Json(records))
}
