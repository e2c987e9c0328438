use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use greenrow_api::{ControlRequestBody, ThresholdRequestBody};
use serde_json::json;
use time::OffsetDateTime;

use crate::errors::{ApiError, RequestError};
use crate::services::PersistenceGateway;

#[derive(Clone)]
pub struct RequestState {
    pub gateway: Arc<dyn PersistenceGateway>,
}

fn validate_threshold(body: &ThresholdRequestBody) -> Result<(), RequestError> {
    if !ThresholdRequestBody::TEMPERATURE_RANGE.contains(&body.temperature) {
        return Err(RequestError::InvalidTemperatureThreshold(body.temperature));
    }
    if !ThresholdRequestBody::HUMIDITY_RANGE.contains(&body.humidity) {
        return Err(RequestError::InvalidHumidityThreshold(body.humidity));
    }
    if !ThresholdRequestBody::SOIL_MOISTURE_RANGE.contains(&body.soil_moisture) {
        return Err(RequestError::InvalidSoilMoistureThreshold(body.soil_moisture));
    }
    if !ThresholdRequestBody::LIGHT_RANGE.contains(&body.light) {
        return Err(RequestError::InvalidLightThreshold(body.light));
    }
    Ok(())
}

pub async fn create_threshold_request(
    State(state): State<RequestState>,
    Json(body): Json<ThresholdRequestBody>,
) -> Result<impl IntoResponse, ApiError> {
    validate_threshold(&body)?;

    let request = state
        .gateway
        .store_threshold_request(&body, OffsetDateTime::now_utc())
        .await?;

    tracing::info!("threshold request for row {} stored", request.row_id);

    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn create_control_request(
    State(state): State<RequestState>,
    Json(body): Json<ControlRequestBody>,
) -> Result<impl IntoResponse, ApiError> {
    let request = state
        .gateway
        .store_control_request(&body, OffsetDateTime::now_utc())
        .await?;

    tracing::info!("control request for row {} stored", request.row_id);

    Ok((StatusCode::CREATED, Json(request)))
}

/// Administrative wipe of telemetry and requests
pub async fn delete_records(
    State(state): State<RequestState>,
) -> Result<impl IntoResponse, ApiError> {
    let removed = state.gateway.clear_all().await?;

    tracing::warn!("deleted {} records", removed);

    Ok(Json(json!({ "removed": removed })))
}
