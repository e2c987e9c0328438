use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::routing::{delete, get, post, put};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::configs::{SchemaManager, Settings, Storage};
use crate::handles::*;
use crate::services::{
    IngestService, NotificationScheduler, PersistenceGateway, RetryPolicy, SqliteGateway,
};

/// Routes shared by the server and the integration tests
pub fn create_router(
    gateway: Arc<dyn PersistenceGateway>,
    scheduler: Arc<NotificationScheduler>,
    ingest_service: Arc<IngestService>,
) -> Router {
    let telemetry = Router::new()
        .route("/rowmeandata", put(put_telemetry))
        .route("/api/rows/:row_id/telemetry", get(get_row_telemetry))
        .with_state(TelemetryState {
            ingest_service,
            gateway: gateway.clone(),
        });

    let payload = Router::new()
        .route("/", get(get_payload))
        .route("/rows/:row_id", get(get_row_payload))
        .route("/observe", get(observe_payload))
        .with_state(PayloadState { scheduler });

    let requests = Router::new()
        .route("/requests/thresholds", post(create_threshold_request))
        .route("/requests/controls", post(create_control_request))
        .route("/records", delete(delete_records))
        .with_state(RequestState { gateway });

    Router::new()
        .merge(telemetry)
        .nest("/userpayload", payload)
        .nest("/api", requests)
}

pub async fn create_app(settings: &Arc<Settings>) -> anyhow::Result<Router> {
    let storage = Arc::new(
        Storage::new(settings.database.clone(), SchemaManager::default())
            .await
            .context("failed to open storage")?,
    );

    let gateway: Arc<dyn PersistenceGateway> = Arc::new(SqliteGateway::new(
        storage,
        RetryPolicy::new(&settings.retry),
    ));

    let scheduler = Arc::new(
        NotificationScheduler::new(
            gateway.clone(),
            settings.notification.clone(),
            settings.codec.checksum,
        )
        .await
        .context("failed to read notification baseline")?,
    );
    scheduler.clone().spawn();

    let ingest_service = Arc::new(IngestService::new(gateway.clone(), settings.ingest.clone()));

    Ok(create_router(gateway, scheduler, ingest_service)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()))
}
