mod control_request;
mod telemetry_record;
mod threshold_request;

use std::fmt;

use time::OffsetDateTime;

pub use control_request::{ControlConfigRequest, ControlRequestTable};
pub use telemetry_record::{TelemetryRecord, TelemetryRecordTable};
pub use threshold_request::{ThresholdConfigRequest, ThresholdRequestTable};

/// Position of a request in its stream. Requests sharing a submission
/// second are told apart by their insertion id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::FromRow)]
pub struct RequestKey {
    pub submitted_at: OffsetDateTime,
    pub id: i32,
}

impl RequestKey {
    /// Sorts before every stored request
    pub const ORIGIN: RequestKey = RequestKey {
        submitted_at: OffsetDateTime::UNIX_EPOCH,
        id: 0,
    };
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.submitted_at, self.id)
    }
}

pub trait Table {
    /// The SQL statement to create the table
    fn create(&self) -> String;

    /// The SQL statement to dispose the table
    fn dispose(&self) -> String;
}
