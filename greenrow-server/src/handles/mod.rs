mod payload_handle;
mod request_handle;
mod telemetry_handle;

pub use payload_handle::*;
pub use request_handle::*;
pub use telemetry_handle::*;
