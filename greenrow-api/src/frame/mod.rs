pub mod config;
mod crc;
pub mod error;
pub mod telemetry;

pub use config::{ChecksumPolicy, ControlConfig, ThresholdConfig, wire_bool, wire_u8, wire_u16};
pub use crc::crc16;
pub use error::{DecodeError, EncodeError};
pub use telemetry::TelemetryFrame;

/// Callers check bounds before reading
fn read_u16_le(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn read_u64_le(data: &[u8], offset: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&data[offset..offset + 8]);
    u64::from_le_bytes(bytes)
}
