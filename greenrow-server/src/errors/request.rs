use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Temperature threshold must be between 0 and 80, got {0}")]
    InvalidTemperatureThreshold(i64),

    #[error("Humidity threshold must be between 0 and 100, got {0}")]
    InvalidHumidityThreshold(i64),

    #[error("Soil moisture threshold must be between 0 and 100, got {0}")]
    InvalidSoilMoistureThreshold(i64),

    #[error("Light threshold must be between 0 and 100, got {0}")]
    InvalidLightThreshold(i64),

    #[error("Telemetry limit must be positive")]
    InvalidLimit,
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}
