#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod frame;
pub mod models;

pub use frame::{
    ChecksumPolicy, ControlConfig, DecodeError, EncodeError, TelemetryFrame, ThresholdConfig,
};
pub use models::*;
