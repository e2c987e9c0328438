use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use super::crc::crc16;
use super::error::EncodeError;

/// How the two reserved trailer bytes of an outbound frame are filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumPolicy {
    /// `0xFF 0xFF`, what deployed firmware expects
    #[default]
    Placeholder,
    /// CRC-16 over the preceding bytes, little-endian. Not understood by
    /// deployed firmware.
    Crc16,
}

impl ChecksumPolicy {
    pub const PLACEHOLDER: [u8; 2] = [0xFF, 0xFF];

    fn trailer(&self, body: &[u8]) -> [u8; 2] {
        match self {
            Self::Placeholder => Self::PLACEHOLDER,
            Self::Crc16 => crc16(body).to_le_bytes(),
        }
    }
}

/// Alarm thresholds for one row.
///
/// ```text
/// [0xB3] [0x0D] [row_id: 1] [temp: 2] [hum: 2] [light: 2] [soil: 2] [reserved: 2]
/// ```
///
/// Light is sent before soil moisture on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub row_id: u8,
    pub temperature: u16,
    pub humidity: u16,
    pub soil_moisture: u16,
    pub light: u16,
}

impl ThresholdConfig {
    pub const OPCODE: u8 = 0xB3;
    pub const SIZE: usize = 13;

    pub fn encode(&self, policy: ChecksumPolicy) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(Self::SIZE);

        buffer.push(Self::OPCODE);
        buffer.push(Self::SIZE as u8);
        buffer.push(self.row_id);
        buffer.extend_from_slice(&self.temperature.to_le_bytes());
        buffer.extend_from_slice(&self.humidity.to_le_bytes());
        buffer.extend_from_slice(&self.light.to_le_bytes());
        buffer.extend_from_slice(&self.soil_moisture.to_le_bytes());

        let trailer = policy.trailer(&buffer);
        buffer.extend_from_slice(&trailer);

        buffer
    }
}

/// Actuator switches for one row.
///
/// ```text
/// [0xB2] [0x09] [row_id: 1] [auto: 1] [light: 1] [water: 1] [fan: 1] [reserved: 2]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlConfig {
    pub row_id: u8,
    pub automatic_control: bool,
    pub light_switch: bool,
    pub water_switch: bool,
    pub fan_switch: bool,
}

impl ControlConfig {
    pub const OPCODE: u8 = 0xB2;
    pub const SIZE: usize = 9;

    pub fn encode(&self, policy: ChecksumPolicy) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(Self::SIZE);

        buffer.push(Self::OPCODE);
        buffer.push(Self::SIZE as u8);
        buffer.push(self.row_id);
        buffer.push(self.automatic_control as u8);
        buffer.push(self.light_switch as u8);
        buffer.push(self.water_switch as u8);
        buffer.push(self.fan_switch as u8);

        let trailer = policy.trailer(&buffer);
        buffer.extend_from_slice(&trailer);

        buffer
    }
}

/// Narrows a stored integer to a one byte wire field
pub fn wire_u8(field: &'static str, value: i64) -> Result<u8, EncodeError> {
    u8::try_from(value).map_err(|_| EncodeError::FieldOutOfRange { field, value })
}

/// Narrows a stored integer to a two byte wire field
pub fn wire_u16(field: &'static str, value: i64) -> Result<u16, EncodeError> {
    u16::try_from(value).map_err(|_| EncodeError::FieldOutOfRange { field, value })
}

/// Narrows a stored 0/1 flag to a wire boolean
pub fn wire_bool(field: &'static str, value: i64) -> Result<bool, EncodeError> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(EncodeError::FieldOutOfRange { field, value }),
    }
}
