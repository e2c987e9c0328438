mod control_request;
mod telemetry_record;
mod threshold_request;

pub use control_request::ControlRequestRepository;
pub use telemetry_record::TelemetryRecordRepository;
pub use threshold_request::ThresholdRequestRepository;
