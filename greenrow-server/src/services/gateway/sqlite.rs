use std::sync::Arc;

use async_trait::async_trait;
use greenrow_api::{ControlRequestBody, RowId, ThresholdRequestBody};
use time::OffsetDateTime;

use super::{PersistenceGateway, RequestScope, control_request, threshold_request};
use crate::configs::Storage;
use crate::errors::StoreError;
use crate::models::{ControlConfigRequest, RequestKey, TelemetryRecord, ThresholdConfigRequest};
use crate::repositories::{
    ControlRequestRepository, TelemetryRecordRepository, ThresholdRequestRepository,
};
use crate::services::RetryPolicy;

pub struct SqliteGateway {
    storage: Arc<Storage>,
    telemetry: TelemetryRecordRepository,
    thresholds: ThresholdRequestRepository,
    controls: ControlRequestRepository,
    retry: RetryPolicy,
}

impl SqliteGateway {
    pub fn new(storage: Arc<Storage>, retry: RetryPolicy) -> Self {
        Self {
            telemetry: TelemetryRecordRepository::new(storage.clone()),
            thresholds: ThresholdRequestRepository::new(storage.clone()),
            controls: ControlRequestRepository::new(storage.clone()),
            storage,
            retry,
        }
    }
}

#[async_trait]
impl PersistenceGateway for SqliteGateway {
    async fn append_telemetry(&self, record: &TelemetryRecord) -> Result<i32, StoreError> {
        self.retry
            .run("append_telemetry", move || async move {
                let mut tx = self.storage.get_pool().begin().await?;
                let id = self.telemetry.create(record, &mut tx).await?;
                tx.commit().await?;
                Ok(id)
            })
            .await
    }

    async fn recent_telemetry(
        &self,
        row_id: RowId,
        limit: i64,
    ) -> Result<Vec<TelemetryRecord>, StoreError> {
        self.retry
            .run("recent_telemetry", move || async move {
                Ok(self
                    .telemetry
                    .find_latest_by_row_id(i32::from(row_id), limit)
                    .await?)
            })
            .await
    }

    async fn store_threshold_request(
        &self,
        body: &ThresholdRequestBody,
        submitted_at: OffsetDateTime,
    ) -> Result<ThresholdConfigRequest, StoreError> {
        let request = threshold_request(body, submitted_at);
        let pending = &request;

        let id = self
            .retry
            .run("store_threshold_request", move || async move {
                let mut tx = self.storage.get_pool().begin().await?;
                let id = self.thresholds.create(pending, &mut tx).await?;
                tx.commit().await?;
                Ok(id)
            })
            .await?;

        Ok(ThresholdConfigRequest { id, ..request })
    }

    async fn store_control_request(
        &self,
        body: &ControlRequestBody,
        submitted_at: OffsetDateTime,
    ) -> Result<ControlConfigRequest, StoreError> {
        let request = control_request(body, submitted_at);
        let pending = &request;

        let id = self
            .retry
            .run("store_control_request", move || async move {
                let mut tx = self.storage.get_pool().begin().await?;
                let id = self.controls.create(pending, &mut tx).await?;
                tx.commit().await?;
                Ok(id)
            })
            .await?;

        Ok(ControlConfigRequest { id, ..request })
    }

    async fn latest_threshold_request_key(&self) -> Result<Option<RequestKey>, StoreError> {
        self.retry
            .run("latest_threshold_request_key", move || async move {
                Ok(self.thresholds.find_latest_key().await?)
            })
            .await
    }

    async fn next_threshold_request_after(
        &self,
        after: RequestKey,
        scope: RequestScope,
    ) -> Result<Option<RequestKey>, StoreError> {
        self.retry
            .run("next_threshold_request_after", move || async move {
                Ok(self
                    .thresholds
                    .find_next_key_after(after, scope.row_id())
                    .await?)
            })
            .await
    }

    async fn fetch_threshold_request(
        &self,
        key: RequestKey,
        scope: RequestScope,
    ) -> Result<Option<ThresholdConfigRequest>, StoreError> {
        self.retry
            .run("fetch_threshold_request", move || async move {
                Ok(self.thresholds.find_by_id(key.id, scope.row_id()).await?)
            })
            .await
    }

    async fn latest_control_request_key(&self) -> Result<Option<RequestKey>, StoreError> {
        self.retry
            .run("latest_control_request_key", move || async move {
                Ok(self.controls.find_latest_key().await?)
            })
            .await
    }

    async fn next_control_request_after(
        &self,
        after: RequestKey,
        scope: RequestScope,
    ) -> Result<Option<RequestKey>, StoreError> {
        self.retry
            .run("next_control_request_after", move || async move {
                Ok(self
                    .controls
                    .find_next_key_after(after, scope.row_id())
                    .await?)
            })
            .await
    }

    async fn fetch_control_request(
        &self,
        key: RequestKey,
        scope: RequestScope,
    ) -> Result<Option<ControlConfigRequest>, StoreError> {
        self.retry
            .run("fetch_control_request", move || async move {
                Ok(self.controls.find_by_id(key.id, scope.row_id()).await?)
            })
            .await
    }

    async fn clear_all(&self) -> Result<u64, StoreError> {
        self.retry
            .run("clear_all", move || async move {
                let mut tx = self.storage.get_pool().begin().await?;
                let mut removed = self.telemetry.delete_all(&mut tx).await?;
                removed += self.thresholds.delete_all(&mut tx).await?;
                removed += self.controls.delete_all(&mut tx).await?;
                tx.commit().await?;
                Ok(removed)
            })
            .await
    }
}
