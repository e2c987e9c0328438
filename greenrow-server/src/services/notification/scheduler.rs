use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use greenrow_api::{ChecksumPolicy, EncodeError};
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::state::{ChannelKey, NotificationChannelState, RequestKind, Watermarks};
use crate::configs::Notification as NotificationConfig;
use crate::errors::StoreError;
use crate::models::RequestKey;
use crate::services::gateway::{PersistenceGateway, RequestScope};

/// Emitted whenever a channel offers a payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub channel: ChannelKey,
    pub payload: Vec<u8>,
    pub redelivery: bool,
}

/// What one tick did to one channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Armed { kind: RequestKind },
    Redelivered { remaining: u8 },
    Idle,
    Suppressed {
        kind: RequestKind,
        error: EncodeError,
    },
    StoreUnavailable,
}

enum PollError {
    Encode(RequestKind, EncodeError),
    Store(StoreError),
}

impl From<StoreError> for PollError {
    fn from(error: StoreError) -> Self {
        PollError::Store(error)
    }
}

pub struct NotificationScheduler {
    gateway: Arc<dyn PersistenceGateway>,
    config: NotificationConfig,
    checksum: ChecksumPolicy,
    baseline: Watermarks,
    channels: RwLock<BTreeMap<ChannelKey, NotificationChannelState>>,
    sender: broadcast::Sender<Notification>,
}

impl NotificationScheduler {
    /// Captures the newest existing requests as the starting marks, so
    /// nothing submitted before start is replayed.
    pub async fn new(
        gateway: Arc<dyn PersistenceGateway>,
        config: NotificationConfig,
        checksum: ChecksumPolicy,
    ) -> Result<Self, StoreError> {
        let baseline = Watermarks {
            threshold: gateway
                .latest_threshold_request_key()
                .await?
                .unwrap_or(RequestKey::ORIGIN),
            control: gateway
                .latest_control_request_key()
                .await?
                .unwrap_or(RequestKey::ORIGIN),
        };

        tracing::info!(
            "notification baseline: threshold {}, control {}",
            baseline.threshold,
            baseline.control
        );

        let mut channels = BTreeMap::new();
        if config.broadcast_channel {
            channels.insert(ChannelKey::Broadcast, NotificationChannelState::new(baseline));
        }

        let (sender, _receiver) = broadcast::channel(64);

        Ok(Self {
            gateway,
            config,
            checksum,
            baseline,
            channels: RwLock::new(channels),
            sender,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Adds a channel starting from the start-up baseline, returns whether
    /// it was new
    pub async fn register(&self, key: ChannelKey) -> bool {
        let mut channels = self.channels.write().await;
        if channels.contains_key(&key) {
            return false;
        }
        channels.insert(key, NotificationChannelState::new(self.baseline));
        tracing::info!("registered notification channel {}", key);
        true
    }

    /// Current payload of a channel, `None` if it is not registered
    pub async fn payload(&self, key: ChannelKey) -> Option<Vec<u8>> {
        self.channels
            .read()
            .await
            .get(&key)
            .map(|state| state.pending_payload().to_vec())
    }

    pub async fn channel_state(&self, key: ChannelKey) -> Option<NotificationChannelState> {
        self.channels.read().await.get(&key).cloned()
    }

    /// Advances every registered channel once
    pub async fn tick(&self) -> Vec<(ChannelKey, TickOutcome)> {
        let keys: Vec<ChannelKey> = self.channels.read().await.keys().copied().collect();
        let mut outcomes = Vec::with_capacity(keys.len());

        for key in keys {
            let Some(mut state) = self.channel_state(key).await else {
                continue;
            };

            let (outcome, notification) = self.advance(key, &mut state).await;

            self.channels.write().await.insert(key, state);

            if let Some(notification) = notification {
                // No subscribers is fine, devices poll instead
                let _ = self.sender.send(notification);
            }

            outcomes.push((key, outcome));
        }

        outcomes
    }

    /// Runs `tick` on the configured period until the process stops
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        let period = Duration::from_millis(self.config.tick_interval_ms.max(1));

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                for (key, outcome) in self.tick().await {
                    tracing::trace!("channel {}: {:?}", key, outcome);
                }
            }
        })
    }

    async fn advance(
        &self,
        key: ChannelKey,
        state: &mut NotificationChannelState,
    ) -> (TickOutcome, Option<Notification>) {
        if let Some(remaining) = state.redeliver() {
            tracing::debug!("redelivering on channel {}, {} left", key, remaining);
            let notification = Notification {
                channel: key,
                payload: state.pending_payload().to_vec(),
                redelivery: true,
            };
            return (TickOutcome::Redelivered { remaining }, Some(notification));
        }

        match self.poll(key.into(), state).await {
            Ok(Some((kind, request, payload))) => {
                tracing::info!("armed {:?} request {} on channel {}", kind, request, key);
                state.arm(kind, request, payload, self.config.redelivery_count);
                let notification = Notification {
                    channel: key,
                    payload: state.pending_payload().to_vec(),
                    redelivery: false,
                };
                (TickOutcome::Armed { kind }, Some(notification))
            }
            Ok(None) => {
                state.clear();
                (TickOutcome::Idle, None)
            }
            Err(PollError::Encode(kind, error)) => {
                tracing::warn!(
                    "suppressed {:?} request on channel {}: {}",
                    kind,
                    key,
                    error
                );
                state.clear();
                (TickOutcome::Suppressed { kind, error }, None)
            }
            Err(PollError::Store(error)) => {
                tracing::error!("store failure on channel {}: {}", key, error);
                state.clear();
                (TickOutcome::StoreUnavailable, None)
            }
        }
    }

    /// Finds the next frame to offer. Threshold requests go first; an
    /// undeliverable threshold request holds back the control stream too.
    async fn poll(
        &self,
        scope: RequestScope,
        state: &NotificationChannelState,
    ) -> Result<Option<(RequestKind, RequestKey, Vec<u8>)>, PollError> {
        let gateway = &self.gateway;

        if let Some(key) = gateway
            .next_threshold_request_after(state.last_threshold_key(), scope)
            .await?
        {
            let encoded = match gateway.fetch_threshold_request(key, scope).await? {
                Some(request) => request.to_config().map(|config| config.encode(self.checksum)),
                None => Err(source_row_missing(key)),
            };

            return encoded
                .map(|payload| Some((RequestKind::Threshold, key, payload)))
                .map_err(|error| PollError::Encode(RequestKind::Threshold, error));
        }

        if let Some(key) = gateway
            .next_control_request_after(state.last_control_key(), scope)
            .await?
        {
            let encoded = match gateway.fetch_control_request(key, scope).await? {
                Some(request) => request.to_config().map(|config| config.encode(self.checksum)),
                None => Err(source_row_missing(key)),
            };

            return encoded
                .map(|payload| Some((RequestKind::Control, key, payload)))
                .map_err(|error| PollError::Encode(RequestKind::Control, error));
        }

        Ok(None)
    }
}

fn source_row_missing(key: RequestKey) -> EncodeError {
    EncodeError::SourceRowMissing {
        submitted_at: key.submitted_at.unix_timestamp(),
    }
}
