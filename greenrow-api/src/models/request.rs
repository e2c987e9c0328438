use core::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::RowId;

/// Operator submitted alarm thresholds for one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdRequestBody {
    pub row_id: RowId,
    /// Temperature threshold in Celsius
    pub temperature: i64,
    /// Relative humidity threshold in percent
    pub humidity: i64,
    /// Soil moisture threshold in percent
    pub soil_moisture: i64,
    /// Light exposure threshold in percent
    pub light: i64,
}

impl ThresholdRequestBody {
    pub const TEMPERATURE_RANGE: RangeInclusive<i64> = 0..=80;
    pub const HUMIDITY_RANGE: RangeInclusive<i64> = 0..=100;
    pub const SOIL_MOISTURE_RANGE: RangeInclusive<i64> = 0..=100;
    pub const LIGHT_RANGE: RangeInclusive<i64> = 0..=100;
}

/// Operator submitted actuator switches for one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlRequestBody {
    pub row_id: RowId,
    #[serde(default)]
    pub light_switch: bool,
    #[serde(default)]
    pub water_switch: bool,
    #[serde(default)]
    pub fan_switch: bool,
    #[serde(default)]
    pub automatic_control: bool,
}
