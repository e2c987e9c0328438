use std::fmt;

use greenrow_api::RowId;
use serde::Serialize;
use crate::models::RequestKey;
use crate::services::gateway::RequestScope;

/// Identifies a notification channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKey {
    /// Requests of every row, what deployed devices observe
    Broadcast,
    Row(RowId),
}

impl From<ChannelKey> for RequestScope {
    fn from(key: ChannelKey) -> Self {
        match key {
            ChannelKey::Broadcast => RequestScope::All,
            ChannelKey::Row(row_id) => RequestScope::Row(row_id),
        }
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKey::Broadcast => write!(f, "broadcast"),
            ChannelKey::Row(row_id) => write!(f, "row {}", row_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Threshold,
    Control,
}

/// High-water marks of the two request streams
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watermarks {
    pub threshold: RequestKey,
    pub control: RequestKey,
}

impl Default for Watermarks {
    fn default() -> Self {
        Self {
            threshold: RequestKey::ORIGIN,
            control: RequestKey::ORIGIN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Armed,
}

/// Delivery progress of one channel.
///
/// While the countdown is above zero the pending payload is non-empty and
/// offered unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationChannelState {
    watermarks: Watermarks,
    pending_payload: Vec<u8>,
    redelivery_countdown: u8,
}

impl NotificationChannelState {
    pub fn new(baseline: Watermarks) -> Self {
        Self {
            watermarks: baseline,
            pending_payload: Vec::new(),
            redelivery_countdown: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.redelivery_countdown > 0 {
            Phase::Armed
        } else {
            Phase::Idle
        }
    }

    pub fn pending_payload(&self) -> &[u8] {
        &self.pending_payload
    }

    pub fn last_threshold_key(&self) -> RequestKey {
        self.watermarks.threshold
    }

    pub fn last_control_key(&self) -> RequestKey {
        self.watermarks.control
    }

    /// Takes a freshly encoded frame and advances the mark of its stream
    pub fn arm(
        &mut self,
        kind: RequestKind,
        key: RequestKey,
        payload: Vec<u8>,
        redelivery_count: u8,
    ) {
        match kind {
            RequestKind::Threshold => self.watermarks.threshold = key,
            RequestKind::Control => self.watermarks.control = key,
        }
        self.redelivery_countdown = if payload.is_empty() { 0 } else { redelivery_count };
        self.pending_payload = payload;
    }

    /// Counts down one redelivery, returns the remaining count, or `None`
    /// when the channel is idle
    pub fn redeliver(&mut self) -> Option<u8> {
        match self.phase() {
            Phase::Armed => {
                self.redelivery_countdown -= 1;
                Some(self.redelivery_countdown)
            }
            Phase::Idle => None,
        }
    }

    pub fn clear(&mut self) {
        self.pending_payload.clear();
        self.redelivery_countdown = 0;
    }
}
