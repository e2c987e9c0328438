use greenrow_api::frame::{wire_bool, wire_u8};
use greenrow_api::{ControlConfig, EncodeError};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{RequestKey, Table};

/// Stored operator actuator request, switches kept as 0/1 integers
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ControlConfigRequest {
    pub id: i32,
    pub row_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
    pub light_switch: i64,
    pub water_switch: i64,
    pub fan_switch: i64,
    pub automatic_control: i64,
}

impl ControlConfigRequest {
    pub fn key(&self) -> RequestKey {
        RequestKey {
            submitted_at: self.submitted_at,
            id: self.id,
        }
    }

    pub fn to_config(&self) -> Result<ControlConfig, EncodeError> {
        Ok(ControlConfig {
            row_id: wire_u8("row_id", self.row_id)?,
            automatic_control: wire_bool("automatic_control", self.automatic_control)?,
            light_switch: wire_bool("light_switch", self.light_switch)?,
            water_switch: wire_bool("water_switch", self.water_switch)?,
            fan_switch: wire_bool("fan_switch", self.fan_switch)?,
        })
    }
}

#[derive(Clone)]
pub struct ControlRequestTable;

impl Table for ControlRequestTable {
    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS control_requests (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                row_id INTEGER NOT NULL,
                submitted_at TIMESTAMP NOT NULL,
                light_switch INTEGER NOT NULL,
                water_switch INTEGER NOT NULL,
                fan_switch INTEGER NOT NULL,
                automatic_control INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_control_requests_submitted_at
                ON control_requests (submitted_at);
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS control_requests;")
    }
}
