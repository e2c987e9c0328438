use std::sync::Arc;

use sqlx::{Error, Sqlite, Transaction};

use crate::configs::Storage;
use crate::models::{RequestKey, ThresholdConfigRequest};

pub struct ThresholdRequestRepository {
    storage: Arc<Storage>,
}

impl ThresholdRequestRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }
}

impl ThresholdRequestRepository {
    pub async fn create(
        &self,
        item: &ThresholdConfigRequest,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<i32, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO threshold_requests (
                row_id, submitted_at, temperature_threshold, humidity_threshold,
                soil_moisture_threshold, light_threshold
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(item.row_id)
        .bind(item.submitted_at)
        .bind(item.temperature_threshold)
        .bind(item.humidity_threshold)
        .bind(item.soil_moisture_threshold)
        .bind(item.light_threshold)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        Ok(id as i32)
    }

    pub async fn find_latest_key(&self) -> Result<Option<RequestKey>, Error> {
        let latest: Option<RequestKey> = sqlx::query_as(
            r#"
            SELECT submitted_at, id FROM threshold_requests
            ORDER BY submitted_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(self.storage.get_pool())
        .await?;

        Ok(latest)
    }

    /// Oldest key strictly after `after`, optionally limited to one row
    pub async fn find_next_key_after(
        &self,
        after: RequestKey,
        row_id: Option<i64>,
    ) -> Result<Option<RequestKey>, Error> {
        let next: Option<RequestKey> = sqlx::query_as(
            r#"
            SELECT submitted_at, id FROM threshold_requests
            WHERE (submitted_at, id) > ($1, $2) AND ($3 IS NULL OR row_id = $3)
            ORDER BY submitted_at ASC, id ASC
            LIMIT 1
            "#,
        )
        .bind(after.submitted_at)
        .bind(after.id)
        .bind(row_id)
        .fetch_optional(self.storage.get_pool())
        .await?;

        Ok(next)
    }

    pub async fn find_by_id(
        &self,
        id: i32,
        row_id: Option<i64>,
    ) -> Result<Option<ThresholdConfigRequest>, Error> {
        let request: Option<ThresholdConfigRequest> = sqlx::query_as(
            r#"
            SELECT * FROM threshold_requests
            WHERE id = $1 AND ($2 IS NULL OR row_id = $2)
            "#,
        )
        .bind(id)
        .bind(row_id)
        .fetch_optional(self.storage.get_pool())
        .await?;

        Ok(request)
    }

    pub async fn delete_all(
        &self,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM threshold_requests")
            .execute(&mut **transaction)
            .await?;

        Ok(result.rows_affected())
    }
}
