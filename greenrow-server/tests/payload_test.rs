use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use greenrow_api::ThresholdRequestBody;
use greenrow_server::configs::{Ingest, Notification};
use greenrow_server::services::notification::RequestKind;
use greenrow_server::services::{ChannelKey, PersistenceGateway, TickOutcome};
use serde_json::json;
use time::OffsetDateTime;
use tokio_stream::StreamExt;
use tower::ServiceExt;

mod common;
use common::mock_app::MockApp;

const SCENARIO_FRAME: [u8; 13] = [
    0xB3, 0x0D, 0x02, 0x46, 0x00, 0x37, 0x00, 0x2C, 0x01, 0x28, 0x00, 0xFF, 0xFF,
];

/// Ticks the scheduler and collects each distinct frame offered on the
/// broadcast channel, in order
async fn offered_frames(app: &MockApp, ticks: usize) -> Vec<Vec<u8>> {
    let mut frames: Vec<Vec<u8>> = Vec::new();
    for _ in 0..ticks {
        app.scheduler.tick().await;
        let (_, body) = app.get("/userpayload").await;
        if !body.is_empty() && frames.last().is_none_or(|last| last[..] != body[..]) {
            frames.push(body.to_vec());
        }
    }
    frames
}

#[tokio::test]
async fn test_threshold_offered_three_times_then_cleared() {
    let app = MockApp::new().await;
    app.insert_threshold(2, 100, [70, 55, 40, 300]).await;

    let (status, body) = app.get("/userpayload").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());

    // t=100, t=102, t=104
    for _ in 0..3 {
        app.scheduler.tick().await;
        let (status, body) = app.get("/userpayload").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], &SCENARIO_FRAME[..]);
    }

    // t=106
    app.scheduler.tick().await;
    let (_, body) = app.get("/userpayload").await;
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_control_waits_for_threshold() {
    let app = MockApp::new().await;
    app.insert_control(4, 100, [1, 0, 1, 1]).await;
    app.insert_threshold(2, 100, [70, 55, 40, 300]).await;

    let outcomes = app.scheduler.tick().await;
    assert_eq!(
        outcomes,
        vec![(
            ChannelKey::Broadcast,
            TickOutcome::Armed {
                kind: RequestKind::Threshold,
            }
        )]
    );

    app.scheduler.tick().await;
    app.scheduler.tick().await;
    let (_, body) = app.get("/userpayload").await;
    assert_eq!(body[0], 0xB3);

    app.scheduler.tick().await;
    let (_, body) = app.get("/userpayload").await;
    assert_eq!(&body[..], &[0xB2, 0x09, 0x04, 0x01, 0x01, 0x00, 0x01, 0xFF, 0xFF]);
}

#[tokio::test]
async fn test_operator_requests_flow_to_devices() {
    let app = MockApp::new().await;

    let (status, _) = app
        .post_json(
            "/api/requests/thresholds",
            json!({
                "row_id": 6,
                "temperature": 30,
                "humidity": 70,
                "soil_moisture": 20,
                "light": 90
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    app.scheduler.tick().await;
    let (_, body) = app.get("/userpayload").await;
    assert_eq!(
        &body[..],
        &[0xB3, 0x0D, 0x06, 0x1E, 0x00, 0x46, 0x00, 0x5A, 0x00, 0x14, 0x00, 0xFF, 0xFF]
    );
}

#[tokio::test]
async fn test_correction_within_a_second_reaches_the_device() {
    let app = MockApp::new().await;
    let base = OffsetDateTime::from_unix_timestamp(1_000).unwrap();

    for (temperature, millis) in [(70, 0), (20, 400)] {
        let body = ThresholdRequestBody {
            row_id: 2,
            temperature,
            humidity: 55,
            soil_moisture: 40,
            light: 300,
        };
        app.gateway
            .store_threshold_request(&body, base + time::Duration::milliseconds(millis))
            .await
            .unwrap();
    }

    let frames = offered_frames(&app, 12).await;
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0], SCENARIO_FRAME);
    assert_eq!(
        frames[1],
        [0xB3, 0x0D, 0x02, 0x14, 0x00, 0x37, 0x00, 0x2C, 0x01, 0x28, 0x00, 0xFF, 0xFF]
    );
}

#[tokio::test]
async fn test_rows_submitted_in_one_second_are_all_broadcast() {
    let app = MockApp::new().await;
    app.insert_threshold(1, 100, [70, 55, 40, 300]).await;
    app.insert_threshold(2, 100, [70, 55, 40, 300]).await;

    let frames = offered_frames(&app, 12).await;
    let rows: Vec<u8> = frames.iter().map(|frame| frame[2]).collect();
    assert_eq!(rows, vec![1, 2]);
}

#[tokio::test]
async fn test_row_channels_are_isolated() {
    let app = MockApp::new().await;

    let (status, body) = app.get("/userpayload/rows/2").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());

    app.insert_threshold(3, 100, [70, 55, 40, 300]).await;
    app.scheduler.tick().await;

    let (_, body) = app.get("/userpayload/rows/2").await;
    assert!(body.is_empty());
    let (_, body) = app.get("/userpayload").await;
    assert_eq!(body[2], 3);

    // Registered late, still starts from the start-up baseline
    let (_, body) = app.get("/userpayload/rows/3").await;
    assert!(body.is_empty());
    app.scheduler.tick().await;
    let (_, body) = app.get("/userpayload/rows/3").await;
    assert_eq!(body[2], 3);
}

#[tokio::test]
async fn test_broadcast_channel_can_be_disabled() {
    let app = MockApp::with_config(
        Notification {
            broadcast_channel: false,
            ..Notification::default()
        },
        Ingest::default(),
    )
    .await;

    let (status, _) = app.get("/userpayload").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get("/userpayload/rows/1").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_observe_needs_a_row_when_broadcast_is_disabled() {
    let app = MockApp::with_config(
        Notification {
            broadcast_channel: false,
            ..Notification::default()
        },
        Ingest::default(),
    )
    .await;

    let (status, _) = app.get("/userpayload/observe").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/userpayload/observe?row_id=3")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.scheduler.channel_state(ChannelKey::Row(3)).await.is_some());
}

#[tokio::test]
async fn test_store_outage_does_not_lose_requests() {
    let app = MockApp::new().await;
    app.insert_threshold(2, 100, [70, 55, 40, 300]).await;
    app.gateway.set_available(false);

    for _ in 0..3 {
        let outcomes = app.scheduler.tick().await;
        assert_eq!(outcomes[0].1, TickOutcome::StoreUnavailable);
        let (status, body) = app.get("/userpayload").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
    }

    app.gateway.set_available(true);
    app.scheduler.tick().await;
    let (_, body) = app.get("/userpayload").await;
    assert_eq!(&body[..], &SCENARIO_FRAME[..]);
}

#[tokio::test]
async fn test_observe_streams_notifications() {
    let app = MockApp::new().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/userpayload/observe")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/event-stream");

    app.insert_threshold(2, 100, [70, 55, 40, 300]).await;
    app.scheduler.tick().await;

    let mut stream = response.into_body().into_data_stream();
    let chunk = tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let text = String::from_utf8(chunk.to_vec()).unwrap();

    assert!(text.contains("event: payload"));
    assert!(text.contains("\"channel\":\"broadcast\""));
    assert!(text.contains("\"payload\":\"b30d02460037002c012800ffff\""));
    assert!(text.contains("\"redelivery\":false"));
}
