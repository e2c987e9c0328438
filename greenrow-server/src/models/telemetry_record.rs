use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::Table;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TelemetryRecord {
    pub id: i32,
    pub row_id: i32,
    /// Device time after the fixed offset, whole seconds
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
    /// Temperature in Celsius
    pub temperature: f32,
    /// Relative humidity %
    pub humidity: f32,
    /// Soil moisture %
    pub soil_moisture: f32,
    /// Raw light intensity
    pub light: i32,
    pub light_switch: bool,
    pub water_switch: bool,
    pub fan_switch: bool,
}

#[derive(Clone)]
pub struct TelemetryRecordTable;

impl Table for TelemetryRecordTable {
    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS telemetry_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                row_id INTEGER NOT NULL,
                recorded_at TIMESTAMP NOT NULL,
                temperature REAL NOT NULL,
                humidity REAL NOT NULL,
                soil_moisture REAL NOT NULL,
                light INTEGER NOT NULL,
                light_switch BOOLEAN NOT NULL,
                water_switch BOOLEAN NOT NULL,
                fan_switch BOOLEAN NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_telemetry_records_row_time
                ON telemetry_records (row_id, recorded_at);
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS telemetry_records;")
    }
}
