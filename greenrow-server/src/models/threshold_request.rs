use greenrow_api::frame::{wire_u8, wire_u16};
use greenrow_api::{EncodeError, ThresholdConfig};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{RequestKey, Table};

/// Stored operator threshold request. Columns are kept as plain integers so
/// that rows which no longer fit the wire format can still be read.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ThresholdConfigRequest {
    pub id: i32,
    pub row_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
    pub temperature_threshold: i64,
    pub humidity_threshold: i64,
    pub soil_moisture_threshold: i64,
    pub light_threshold: i64,
}

impl ThresholdConfigRequest {
    pub fn key(&self) -> RequestKey {
        RequestKey {
            submitted_at: self.submitted_at,
            id: self.id,
        }
    }

    pub fn to_config(&self) -> Result<ThresholdConfig, EncodeError> {
        Ok(ThresholdConfig {
            row_id: wire_u8("row_id", self.row_id)?,
            temperature: wire_u16("temperature_threshold", self.temperature_threshold)?,
            humidity: wire_u16("humidity_threshold", self.humidity_threshold)?,
            soil_moisture: wire_u16("soil_moisture_threshold", self.soil_moisture_threshold)?,
            light: wire_u16("light_threshold", self.light_threshold)?,
        })
    }
}

#[derive(Clone)]
pub struct ThresholdRequestTable;

impl Table for ThresholdRequestTable {
    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS threshold_requests (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                row_id INTEGER NOT NULL,
                submitted_at TIMESTAMP NOT NULL,
                temperature_threshold INTEGER NOT NULL,
                humidity_threshold INTEGER NOT NULL,
                soil_moisture_threshold INTEGER NOT NULL,
                light_threshold INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_threshold_requests_submitted_at
                ON threshold_requests (submitted_at);
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS threshold_requests;")
    }
}
