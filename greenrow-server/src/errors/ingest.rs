use axum::http::StatusCode;
use greenrow_api::DecodeError;

use super::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Malformed telemetry frame: {0}")]
    Decode(#[from] DecodeError),

    #[error("Telemetry timestamp out of range: {0} ms")]
    InvalidTimestamp(u64),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IngestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            IngestError::Decode(_) => StatusCode::BAD_REQUEST,
            IngestError::InvalidTimestamp(_) => StatusCode::BAD_REQUEST,
            IngestError::Store(e) if e.is_unavailable() => StatusCode::SERVICE_UNAVAILABLE,
            IngestError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
