use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use async_trait::async_trait;
use greenrow_api::{ControlRequestBody, RowId, ThresholdRequestBody};
use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::{
    PersistenceGateway, RequestScope, control_request, threshold_request, truncate_to_seconds,
};
use crate::errors::StoreError;
use crate::models::{ControlConfigRequest, RequestKey, TelemetryRecord, ThresholdConfigRequest};

/// In-process gateway with a switch to simulate an unreachable store
#[derive(Default)]
pub struct MemoryGateway {
    telemetry: RwLock<Vec<TelemetryRecord>>,
    thresholds: RwLock<Vec<ThresholdConfigRequest>>,
    controls: RwLock<Vec<ControlConfigRequest>>,
    hidden_thresholds: RwLock<BTreeSet<i32>>,
    last_request_id: AtomicI32,
    unavailable: AtomicBool,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Inserts a row as is, without operator input validation. Ids keep
    /// growing across `clear_all`, like an autoincrement column.
    pub async fn insert_threshold_request(
        &self,
        mut request: ThresholdConfigRequest,
    ) -> RequestKey {
        request.id = self.last_request_id.fetch_add(1, Ordering::SeqCst) + 1;
        request.submitted_at = truncate_to_seconds(request.submitted_at);
        let key = request.key();
        self.thresholds.write().await.push(request);
        key
    }

    pub async fn insert_control_request(&self, mut request: ControlConfigRequest) -> RequestKey {
        request.id = self.last_request_id.fetch_add(1, Ordering::SeqCst) + 1;
        request.submitted_at = truncate_to_seconds(request.submitted_at);
        let key = request.key();
        self.controls.write().await.push(request);
        key
    }

    /// Drops a threshold row while leaving its key visible to
    /// `next_threshold_request_after`
    pub async fn hide_threshold_request(&self, key: RequestKey) {
        self.hidden_thresholds.write().await.insert(key.id);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("memory gateway switched off".into()))
        } else {
            Ok(())
        }
    }
}

fn next_after(
    rows: impl Iterator<Item = (i64, RequestKey)>,
    after: RequestKey,
    scope: RequestScope,
) -> Option<RequestKey> {
    rows.filter(|(row_id, key)| *key > after && scope.contains(*row_id))
        .map(|(_, key)| key)
        .min()
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn append_telemetry(&self, record: &TelemetryRecord) -> Result<i32, StoreError> {
        self.check()?;
        let mut rows = self.telemetry.write().await;
        let id = rows.len() as i32 + 1;
        rows.push(TelemetryRecord {
            id,
            ..record.clone()
        });
        Ok(id)
    }

    async fn recent_telemetry(
        &self,
        row_id: RowId,
        limit: i64,
    ) -> Result<Vec<TelemetryRecord>, StoreError> {
        self.check()?;
        let mut records: Vec<TelemetryRecord> = self
            .telemetry
            .read()
            .await
            .iter()
            .filter(|record| record.row_id == i32::from(row_id))
            .cloned()
            .collect();
        records.sort_by_key(|record| (record.recorded_at, record.id));

        let skip = records.len().saturating_sub(limit.max(0) as usize);
        Ok(records.split_off(skip))
    }

    async fn store_threshold_request(
        &self,
        body: &ThresholdRequestBody,
        submitted_at: OffsetDateTime,
    ) -> Result<ThresholdConfigRequest, StoreError> {
        self.check()?;
        let request = threshold_request(body, submitted_at);
        let id = self.insert_threshold_request(request.clone()).await.id;
        Ok(ThresholdConfigRequest { id, ..request })
    }

    async fn store_control_request(
        &self,
        body: &ControlRequestBody,
        submitted_at: OffsetDateTime,
    ) -> Result<ControlConfigRequest, StoreError> {
        self.check()?;
        let request = control_request(body, submitted_at);
        let id = self.insert_control_request(request.clone()).await.id;
        Ok(ControlConfigRequest { id, ..request })
    }

    async fn latest_threshold_request_key(&self) -> Result<Option<RequestKey>, StoreError> {
        self.check()?;
        let rows = self.thresholds.read().await;
        Ok(rows.iter().map(ThresholdConfigRequest::key).max())
    }

    async fn next_threshold_request_after(
        &self,
        after: RequestKey,
        scope: RequestScope,
    ) -> Result<Option<RequestKey>, StoreError> {
        self.check()?;
        let rows = self.thresholds.read().await;
        Ok(next_after(
            rows.iter().map(|row| (row.row_id, row.key())),
            after,
            scope,
        ))
    }

    async fn fetch_threshold_request(
        &self,
        key: RequestKey,
        scope: RequestScope,
    ) -> Result<Option<ThresholdConfigRequest>, StoreError> {
        self.check()?;
        if self.hidden_thresholds.read().await.contains(&key.id) {
            return Ok(None);
        }
        let rows = self.thresholds.read().await;
        Ok(rows
            .iter()
            .find(|row| row.id == key.id && scope.contains(row.row_id))
            .cloned())
    }

    async fn latest_control_request_key(&self) -> Result<Option<RequestKey>, StoreError> {
        self.check()?;
        let rows = self.controls.read().await;
        Ok(rows.iter().map(ControlConfigRequest::key).max())
    }

    async fn next_control_request_after(
        &self,
        after: RequestKey,
        scope: RequestScope,
    ) -> Result<Option<RequestKey>, StoreError> {
        self.check()?;
        let rows = self.controls.read().await;
        Ok(next_after(
            rows.iter().map(|row| (row.row_id, row.key())),
            after,
            scope,
        ))
    }

    async fn fetch_control_request(
        &self,
        key: RequestKey,
        scope: RequestScope,
    ) -> Result<Option<ControlConfigRequest>, StoreError> {
        self.check()?;
        let rows = self.controls.read().await;
        Ok(rows
            .iter()
            .find(|row| row.id == key.id && scope.contains(row.row_id))
            .cloned())
    }

    async fn clear_all(&self) -> Result<u64, StoreError> {
        self.check()?;
        self.hidden_thresholds.write().await.clear();
        let mut removed = std::mem::take(&mut *self.telemetry.write().await).len();
        removed += std::mem::take(&mut *self.thresholds.write().await).len();
        removed += std::mem::take(&mut *self.controls.write().await).len();
        Ok(removed as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(secs).unwrap()
    }

    #[tokio::test]
    async fn test_unavailable_switch() {
        let gateway = MemoryGateway::new();
        gateway.set_available(false);

        assert!(
            gateway
                .latest_threshold_request_key()
                .await
                .unwrap_err()
                .is_unavailable()
        );

        gateway.set_available(true);
        assert_eq!(gateway.latest_threshold_request_key().await.unwrap(), None);
    }

    fn threshold(row_id: i64, secs: i64) -> ThresholdConfigRequest {
        ThresholdConfigRequest {
            id: 0,
            row_id,
            submitted_at: at(secs),
            temperature_threshold: 70,
            humidity_threshold: 55,
            soil_moisture_threshold: 40,
            light_threshold: 300,
        }
    }

    #[tokio::test]
    async fn test_hidden_row_keeps_its_key() {
        let gateway = MemoryGateway::new();
        let key = gateway.insert_threshold_request(threshold(1, 100)).await;
        gateway.hide_threshold_request(key).await;

        let next = gateway
            .next_threshold_request_after(RequestKey::ORIGIN, RequestScope::All)
            .await
            .unwrap();
        assert_eq!(next, Some(key));
        assert_eq!(
            gateway
                .fetch_threshold_request(key, RequestScope::All)
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_same_second_requests_keep_insertion_order() {
        let gateway = MemoryGateway::new();
        let first = gateway.insert_threshold_request(threshold(2, 100)).await;
        let second = gateway.insert_threshold_request(threshold(1, 100)).await;
        assert_eq!(first.submitted_at, second.submitted_at);

        let next = gateway
            .next_threshold_request_after(first, RequestScope::All)
            .await
            .unwrap();
        assert_eq!(next, Some(second));
        assert_eq!(
            gateway.latest_threshold_request_key().await.unwrap(),
            Some(second)
        );
    }

    #[tokio::test]
    async fn test_ids_survive_clear_all() {
        let gateway = MemoryGateway::new();
        let before = gateway.insert_threshold_request(threshold(1, 100)).await;
        gateway.clear_all().await.unwrap();
        let after = gateway.insert_threshold_request(threshold(1, 100)).await;

        assert!(after > before);
    }

    #[tokio::test]
    async fn test_recent_telemetry_is_oldest_first() {
        let gateway = MemoryGateway::new();
        for (secs, light) in [(30, 3), (10, 1), (20, 2)] {
            gateway
                .append_telemetry(&TelemetryRecord {
                    id: 0,
                    row_id: 4,
                    recorded_at: at(secs),
                    temperature: 20.0,
                    humidity: 40.0,
                    soil_moisture: 30.0,
                    light,
                    light_switch: false,
                    water_switch: false,
                    fan_switch: false,
                })
                .await
                .unwrap();
        }

        let recent = gateway.recent_telemetry(4, 2).await.unwrap();
        assert_eq!(recent.iter().map(|r| r.light).collect::<Vec<_>>(), vec![2, 3]);
    }
}
