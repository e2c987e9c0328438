use super::{IngestError, RequestError, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request error: {0}")]
    RequestError(#[from] RequestError),

    #[error("Ingest error: {0}")]
    IngestError(#[from] IngestError),

    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}
