use serde::{Deserialize, Serialize};

use super::error::DecodeError;
use super::{read_u16_le, read_u64_le};

/// Periodic row report sent by a row controller.
///
/// ```text
/// [type: 1] [len: 1] [temp: 2] [hum: 2] [soil: 2] [light: 2]
/// [row_id: 1] [timestamp_ms: 8] [light_sw: 1] [water_sw: 1] [fan_sw: 1]
/// ```
///
/// All integers are little-endian and unsigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryFrame {
    pub message_type: u8,
    /// Declared length as sent by the device, not checked
    pub length: u8,
    pub row_id: u8,
    /// Device clock in milliseconds since the epoch
    pub timestamp_millis: u64,
    /// Temperature in hundredths of a degree Celsius
    pub temperature_centi: u16,
    /// Relative humidity in hundredths of a percent
    pub humidity_centi: u16,
    /// Soil moisture in hundredths of a percent
    pub soil_moisture_centi: u16,
    pub light_intensity: u16,
    pub light_switch: bool,
    pub water_switch: bool,
    pub fan_switch: bool,
}

impl TelemetryFrame {
    /// Fixed frame length on the wire
    pub const SIZE: usize = 22;

    /// Message type tag used by the row controllers
    pub const MESSAGE_TYPE: u8 = 0xB1;

    /// Decodes the first [`Self::SIZE`] bytes of `data`.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < Self::SIZE {
            return Err(DecodeError::TooShort {
                len: data.len(),
                expected: Self::SIZE,
            });
        }

        Ok(Self {
            message_type: data[0],
            length: data[1],
            temperature_centi: read_u16_le(data, 2),
            humidity_centi: read_u16_le(data, 4),
            soil_moisture_centi: read_u16_le(data, 6),
            light_intensity: read_u16_le(data, 8),
            row_id: data[10],
            timestamp_millis: read_u64_le(data, 11),
            light_switch: data[19] != 0,
            water_switch: data[20] != 0,
            fan_switch: data[21] != 0,
        })
    }

    /// Decodes a buffer that must hold exactly one frame, optionally followed
    /// by the two byte checksum trailer the firmware appends.
    pub fn decode_exact(data: &[u8], allow_trailer: bool) -> Result<Self, DecodeError> {
        let frame = Self::decode(data)?;

        match data.len() {
            Self::SIZE => Ok(frame),
            len if allow_trailer && len == Self::SIZE + 2 => Ok(frame),
            len => Err(DecodeError::UnexpectedLength { len }),
        }
    }

    pub fn temperature(&self) -> f32 {
        f32::from(self.temperature_centi) / 100.0
    }

    pub fn humidity(&self) -> f32 {
        f32::from(self.humidity_centi) / 100.0
    }

    pub fn soil_moisture(&self) -> f32 {
        f32::from(self.soil_moisture_centi) / 100.0
    }

    /// Device timestamp truncated to whole seconds
    pub fn timestamp_secs(&self) -> u64 {
        self.timestamp_millis / 1000
    }
}
