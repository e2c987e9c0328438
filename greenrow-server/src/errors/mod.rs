pub mod api;
pub mod ingest;
pub mod request;
pub mod store;

pub use api::ApiError;
pub use ingest::IngestError;
pub use request::RequestError;
pub use store::StoreError;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use uuid::Uuid;

fn internal_error(
    kind: &str,
    error: &dyn std::fmt::Display,
) -> (StatusCode, String, Option<String>) {
    let error_id = Uuid::new_v4();
    tracing::error!(error_id = ?error_id, "{}: {}", kind, error);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
        Some(error_id.to_string()),
    )
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, error_id) = match self {
            ApiError::RequestError(e) => (e.status_code(), e.to_string(), None),
            ApiError::IngestError(IngestError::Store(e)) => store_error(e),
            ApiError::IngestError(e) => {
                tracing::warn!("rejected telemetry: {}", e);
                (e.status_code(), e.to_string(), None)
            }
            ApiError::StoreError(e) => store_error(e),
            ApiError::InternalError(e) => internal_error("Internal error", &e),
        };

        let mut error_obj = json!({
            "code": status.as_u16(),
            "message": error_message
        });

        if let Some(error_id) = error_id {
            error_obj["error_id"] = json!(error_id);
        }

        let body = Json(json!({
            "error": error_obj
        }));

        (status, body).into_response()
    }
}

fn store_error(error: StoreError) -> (StatusCode, String, Option<String>) {
    if error.is_unavailable() {
        tracing::error!("store unavailable: {}", error);
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "Store unavailable".to_string(),
            None,
        )
    } else {
        internal_error("Database error", &error)
    }
}
