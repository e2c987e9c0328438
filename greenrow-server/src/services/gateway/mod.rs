mod sqlite;
#[cfg(any(test, feature = "mock"))]
mod memory;

pub use sqlite::SqliteGateway;
#[cfg(any(test, feature = "mock"))]
pub use memory::MemoryGateway;

use async_trait::async_trait;
use greenrow_api::{ControlRequestBody, RowId, ThresholdRequestBody};
use time::{Duration, OffsetDateTime, UtcOffset};

use crate::errors::StoreError;
use crate::models::{ControlConfigRequest, RequestKey, TelemetryRecord, ThresholdConfigRequest};

/// Which request rows a lookup may see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestScope {
    All,
    Row(RowId),
}

impl RequestScope {
    pub fn row_id(&self) -> Option<i64> {
        match self {
            RequestScope::All => None,
            RequestScope::Row(row_id) => Some(i64::from(*row_id)),
        }
    }

    pub fn contains(&self, row_id: i64) -> bool {
        self.row_id().is_none_or(|scoped| scoped == row_id)
    }
}

/// Query interface over telemetry and operator requests.
///
/// Lookups return `Ok(None)` when nothing matches, so an empty table and an
/// unreachable store never look the same to the caller.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    async fn append_telemetry(&self, record: &TelemetryRecord) -> Result<i32, StoreError>;

    /// Latest `limit` records of a row, oldest first
    async fn recent_telemetry(
        &self,
        row_id: RowId,
        limit: i64,
    ) -> Result<Vec<TelemetryRecord>, StoreError>;

    async fn store_threshold_request(
        &self,
        body: &ThresholdRequestBody,
        submitted_at: OffsetDateTime,
    ) -> Result<ThresholdConfigRequest, StoreError>;

    async fn store_control_request(
        &self,
        body: &ControlRequestBody,
        submitted_at: OffsetDateTime,
    ) -> Result<ControlConfigRequest, StoreError>;

    /// Key of the newest threshold request
    async fn latest_threshold_request_key(&self) -> Result<Option<RequestKey>, StoreError>;

    /// Earliest threshold request key strictly after `after` within `scope`
    async fn next_threshold_request_after(
        &self,
        after: RequestKey,
        scope: RequestScope,
    ) -> Result<Option<RequestKey>, StoreError>;

    async fn fetch_threshold_request(
        &self,
        key: RequestKey,
        scope: RequestScope,
    ) -> Result<Option<ThresholdConfigRequest>, StoreError>;

    async fn latest_control_request_key(&self) -> Result<Option<RequestKey>, StoreError>;

    async fn next_control_request_after(
        &self,
        after: RequestKey,
        scope: RequestScope,
    ) -> Result<Option<RequestKey>, StoreError>;

    async fn fetch_control_request(
        &self,
        key: RequestKey,
        scope: RequestScope,
    ) -> Result<Option<ControlConfigRequest>, StoreError>;

    /// Deletes all telemetry and requests, returns the number of rows removed
    async fn clear_all(&self) -> Result<u64, StoreError>;
}

/// Stored timestamps are whole UTC seconds
pub fn truncate_to_seconds(at: OffsetDateTime) -> OffsetDateTime {
    let at = at.to_offset(UtcOffset::UTC);
    at - Duration::nanoseconds(i64::from(at.nanosecond()))
}

fn threshold_request(
    body: &ThresholdRequestBody,
    submitted_at: OffsetDateTime,
) -> ThresholdConfigRequest {
    ThresholdConfigRequest {
        id: 0,
        row_id: i64::from(body.row_id),
        submitted_at: truncate_to_seconds(submitted_at),
        temperature_threshold: body.temperature,
        humidity_threshold: body.humidity,
        soil_moisture_threshold: body.soil_moisture,
        light_threshold: body.light,
    }
}

fn control_request(
    body: &ControlRequestBody,
    submitted_at: OffsetDateTime,
) -> ControlConfigRequest {
    ControlConfigRequest {
        id: 0,
        row_id: i64::from(body.row_id),
        submitted_at: truncate_to_seconds(submitted_at),
        light_switch: i64::from(body.light_switch),
        water_switch: i64::from(body.water_switch),
        fan_switch: i64::from(body.fan_switch),
        automatic_control: i64::from(body.automatic_control),
    }
}
