use std::sync::Arc;

use sqlx::{Error, Sqlite, Transaction};

use crate::configs::Storage;
use crate::models::{ControlConfigRequest, RequestKey};

pub struct ControlRequestRepository {
    storage: Arc<Storage>,
}

impl ControlRequestRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }
}

impl ControlRequestRepository {
    pub async fn create(
        &self,
        item: &ControlConfigRequest,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<i32, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO control_requests (
                row_id, submitted_at, light_switch, water_switch, fan_switch, automatic_control
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(item.row_id)
        .bind(item.submitted_at)
        .bind(item.light_switch)
        .bind(item.water_switch)
        .bind(item.fan_switch)
        .bind(item.automatic_control)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        Ok(id as i32)
    }

    pub async fn find_latest_key(&self) -> Result<Option<RequestKey>, Error> {
        let latest: Option<RequestKey> = sqlx::query_as(
            r#"
            SELECT submitted_at, id FROM control_requests
            ORDER BY submitted_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(self.storage.get_pool())
        .await?;

        Ok(latest)
    }

    pub async fn find_next_key_after(
        &self,
        after: RequestKey,
        row_id: Option<i64>,
    ) -> Result<Option<RequestKey>, Error> {
        let next: Option<RequestKey> = sqlx::query_as(
            r#"
            SELECT submitted_at, id FROM control_requests
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
    ) -> Result<Option<ControlConfigRequest>, Error> {
        let request: Option<ControlConfigRequest> = sqlx::query_as(
            r#"
            SELECT * FROM control_requests
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
        let result = sqlx::query("DELETE FROM control_requests")
            .execute(&mut **transaction)
            .await?;

        Ok(result.rows_affected())
    }
}
