use std::sync::Arc;

use sqlx::{Error, Sqlite, Transaction};

use crate::configs::Storage;
use crate::models::TelemetryRecord;

pub struct TelemetryRecordRepository {
    storage: Arc<Storage>,
}

impl TelemetryRecordRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }
}

impl TelemetryRecordRepository {
    pub async fn create(
        &self,
        item: &TelemetryRecord,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<i32, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO telemetry_records (
                row_id, recorded_at, temperature, humidity, soil_moisture,
                light, light_switch, water_switch, fan_switch
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(item.row_id)
        .bind(item.recorded_at)
        .bind(item.temperature)
        .bind(item.humidity)
        .bind(item.soil_moisture)
        .bind(item.light)
        .bind(item.light_switch)
        .bind(item.water_switch)
        .bind(item.fan_switch)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        Ok(id as i32)
    }

    /// Latest `limit` records of a row, oldest first
    pub async fn find_latest_by_row_id(
        &self,
        row_id: i32,
        limit: i64,
    ) -> Result<Vec<TelemetryRecord>, Error> {
        let mut records: Vec<TelemetryRecord> = sqlx::query_as(
            r#"
            SELECT * FROM telemetry_records
            WHERE row_id = $1
            ORDER BY recorded_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(row_id)
        .bind(limit)
        .fetch_all(self.storage.get_pool())
        .await?;

        records.reverse();

        Ok(records)
    }

    pub async fn delete_all(
        &self,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM telemetry_records")
            .execute(&mut **transaction)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use time::{Duration, OffsetDateTime};

    use crate::configs::{Database, SchemaManager};

    use super::*;

    async fn setup_test_db() -> Arc<Storage> {
        Arc::new(
            Storage::new(
                Database {
                    migration_path: None,
                    clean_start: true,
                    url: String::from("sqlite::memory:"),
                },
                SchemaManager::default(),
            )
            .await
            .unwrap(),
        )
    }

    fn record(row_id: i32, recorded_at: OffsetDateTime, light: i32) -> TelemetryRecord {
        TelemetryRecord {
            id: 0,
            row_id,
            recorded_at,
            temperature: 23.45,
            humidity: 60.5,
            soil_moisture: 41.99,
            light,
            light_switch: true,
            water_switch: false,
            fan_switch: true,
        }
    }

    #[tokio::test]
    async fn test_create_and_read_back_telemetry_record() {
        let storage = setup_test_db().await;
        let repo = TelemetryRecordRepository::new(storage.clone());
        let recorded_at = OffsetDateTime::from_unix_timestamp(1_650_003_600).unwrap();

        let mut tx = storage.get_pool().begin().await.unwrap();
        let id = repo.create(&record(3, recorded_at, 812), &mut tx).await.unwrap();
        tx.commit().await.unwrap();

        let found = repo.find_latest_by_row_id(3, 1).await.unwrap().remove(0);
        assert_eq!(found.id, id);
        assert_eq!(found.row_id, 3);
        assert_eq!(found.recorded_at, recorded_at);
        assert_eq!(found.light, 812);
        assert_eq!(found.temperature, 23.45);
        assert!(found.light_switch);
        assert!(!found.water_switch);
    }

    #[tokio::test]
    async fn test_find_latest_by_row_id() {
        let storage = setup_test_db().await;
        let repo = TelemetryRecordRepository::new(storage.clone());
        let base = OffsetDateTime::from_unix_timestamp(1_650_000_000).unwrap();

        let mut tx = storage.get_pool().begin().await.unwrap();
        for (offset, light) in [(0, 100), (60, 150), (120, 200)] {
            repo.create(&record(1, base + Duration::seconds(offset), light), &mut tx)
                .await
                .unwrap();
        }
        repo.create(&record(2, base + Duration::seconds(180), 999), &mut tx)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let latest = repo.find_latest_by_row_id(1, 2).await.unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].light, 150);
        assert_eq!(latest[1].light, 200);
    }

    #[tokio::test]
    async fn test_delete_all() {
        let storage = setup_test_db().await;
        let repo = TelemetryRecordRepository::new(storage.clone());
        let now = OffsetDateTime::from_unix_timestamp(1_650_000_000).unwrap();

        let mut tx = storage.get_pool().begin().await.unwrap();
        repo.create(&record(1, now, 1), &mut tx).await.unwrap();
        repo.create(&record(2, now, 2), &mut tx).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = storage.get_pool().begin().await.unwrap();
        assert_eq!(repo.delete_all(&mut tx).await.unwrap(), 2);
        tx.commit().await.unwrap();

        assert!(repo.find_latest_by_row_id(1, 10).await.unwrap().is_empty());
    }
}
