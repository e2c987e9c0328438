use std::sync::Arc;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{Method, Request, StatusCode};
use greenrow_api::ChecksumPolicy;
use greenrow_server::app::create_router;
use greenrow_server::configs::{Ingest, Notification};
use greenrow_server::models::{ControlConfigRequest, ThresholdConfigRequest};
use greenrow_server::services::gateway::MemoryGateway;
use greenrow_server::services::{IngestService, NotificationScheduler};
use time::OffsetDateTime;
use tower::ServiceExt;

pub struct MockApp {
    pub gateway: Arc<MemoryGateway>,
    pub scheduler: Arc<NotificationScheduler>,
    pub router: Router,
}

impl MockApp {
    pub async fn new() -> Self {
        Self::with_config(Notification::default(), Ingest::default()).await
    }

    pub async fn with_config(notification: Notification, ingest: Ingest) -> Self {
        let gateway = Arc::new(MemoryGateway::new());

        let scheduler = Arc::new(
            NotificationScheduler::new(gateway.clone(), notification, ChecksumPolicy::Placeholder)
                .await
                .unwrap(),
        );

        let ingest_service = Arc::new(IngestService::new(gateway.clone(), ingest));

        let router = create_router(gateway.clone(), scheduler.clone(), ingest_service);

        Self {
            gateway,
            scheduler,
            router,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Bytes) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Bytes) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> (StatusCode, Bytes) {
        self.send(
            Request::builder()
                .uri(uri)
                .method(Method::POST)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn put_frame(&self, frame: Vec<u8>) -> (StatusCode, Bytes) {
        self.send(
            Request::builder()
                .uri("/rowmeandata")
                .method(Method::PUT)
                .body(Body::from(frame))
                .unwrap(),
        )
        .await
    }

    /// Stores a threshold row directly, bypassing operator validation
    pub async fn insert_threshold(
        &self,
        row_id: i64,
        submitted_at: i64,
        values: [i64; 4],
    ) -> ThresholdConfigRequest {
        let [temperature, humidity, soil_moisture, light] = values;
        let request = ThresholdConfigRequest {
            id: 0,
            row_id,
            submitted_at: OffsetDateTime::from_unix_timestamp(submitted_at).unwrap(),
            temperature_threshold: temperature,
            humidity_threshold: humidity,
            soil_moisture_threshold: soil_moisture,
            light_threshold: light,
        };
        let id = self
            .gateway
            .insert_threshold_request(request.clone())
            .await
            .id;

        ThresholdConfigRequest { id, ..request }
    }

    pub async fn insert_control(&self, row_id: i64, submitted_at: i64, switches: [i64; 4]) {
        let [light_switch, water_switch, fan_switch, automatic_control] = switches;
        self.gateway
            .insert_control_request(ControlConfigRequest {
                id: 0,
                row_id,
                submitted_at: OffsetDateTime::from_unix_timestamp(submitted_at).unwrap(),
                light_switch,
                water_switch,
                fan_switch,
                automatic_control,
            })
            .await;
    }
}

/// A valid 22 byte telemetry frame
pub fn telemetry_frame(row_id: u8, timestamp_millis: u64) -> Vec<u8> {
    let mut data = vec![0xB1, 22];
    data.extend_from_slice(&2345u16.to_le_bytes());
    data.extend_from_slice(&6050u16.to_le_bytes());
    data.extend_from_slice(&4199u16.to_le_bytes());
    data.extend_from_slice(&812u16.to_le_bytes());
    data.push(row_id);
    data.extend_from_slice(&timestamp_millis.to_le_bytes());
    data.extend_from_slice(&[1, 0, 1]);
    data
}
