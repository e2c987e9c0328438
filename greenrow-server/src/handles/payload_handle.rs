use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive};
use axum::response::{IntoResponse, Sse};
use greenrow_api::RowId;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use crate::services::{ChannelKey, Notification, NotificationScheduler};

#[derive(Clone, Serialize, Deserialize)]
pub struct ObserveQuery {
    pub row_id: Option<RowId>,
}

/// Server-sent form of a [`Notification`]
#[derive(Clone, Debug, Serialize)]
pub struct NotificationEvent {
    pub channel: ChannelKey,
    /// Frame bytes as lowercase hex
    pub payload: String,
    pub redelivery: bool,
}

impl From<Notification> for NotificationEvent {
    fn from(notification: Notification) -> Self {
        Self {
            channel: notification.channel,
            payload: hex::encode(&notification.payload),
            redelivery: notification.redelivery,
        }
    }
}

#[derive(Clone)]
pub struct PayloadState {
    pub scheduler: Arc<NotificationScheduler>,
}

/// Payload of the all-rows channel, empty when nothing is pending
pub async fn get_payload(
    State(state): State<PayloadState>,
) -> Result<impl IntoResponse, StatusCode> {
    state
        .scheduler
        .payload(ChannelKey::Broadcast)
        .await
        .map(Bytes::from)
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn get_row_payload(
    Path(row_id): Path<RowId>,
    State(state): State<PayloadState>,
) -> impl IntoResponse {
    let key = ChannelKey::Row(row_id);
    state.scheduler.register(key).await;

    Bytes::from(state.scheduler.payload(key).await.unwrap_or_default())
}

/// Streams the notifications of one row, or of the all-rows channel when
/// no row is given and that channel is enabled
pub async fn observe_payload(
    Query(query): Query<ObserveQuery>,
    State(state): State<PayloadState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, StatusCode> {
    let channel = query.row_id.map_or(ChannelKey::Broadcast, ChannelKey::Row);
    match channel {
        ChannelKey::Row(_) => {
            state.scheduler.register(channel).await;
        }
        ChannelKey::Broadcast => {
            if state.scheduler.payload(channel).await.is_none() {
                return Err(StatusCode::NOT_FOUND);
            }
        }
    }

    let stream = BroadcastStream::new(state.scheduler.subscribe()).filter_map(move |result| {
        match result {
            Ok(notification) if notification.channel == channel => {
                Event::default()
                    .event("payload")
                    .json_data(NotificationEvent::from(notification))
                    .ok()
                    .map(Ok)
            }
            _ => None,
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
