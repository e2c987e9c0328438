use std::sync::Arc;

use greenrow_api::TelemetryFrame;
use time::OffsetDateTime;

use crate::configs::Ingest;
use crate::errors::IngestError;
use crate::models::TelemetryRecord;
use crate::services::gateway::PersistenceGateway;

/// Turns raw telemetry uploads into stored records
pub struct IngestService {
    gateway: Arc<dyn PersistenceGateway>,
    config: Ingest,
}

impl IngestService {
    pub fn new(gateway: Arc<dyn PersistenceGateway>, config: Ingest) -> Self {
        Self { gateway, config }
    }

    pub fn to_record(&self, frame: &TelemetryFrame) -> Result<TelemetryRecord, IngestError> {
        let recorded_at = i64::try_from(frame.timestamp_secs())
            .ok()
            .and_then(|secs| secs.checked_add(self.config.utc_offset_secs))
            .and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
            .ok_or(IngestError::InvalidTimestamp(frame.timestamp_millis))?;

        Ok(TelemetryRecord {
            id: 0,
            row_id: i32::from(frame.row_id),
            recorded_at,
            temperature: frame.temperature(),
            humidity: frame.humidity(),
            soil_moisture: frame.soil_moisture(),
            light: i32::from(frame.light_intensity),
            light_switch: frame.light_switch,
            water_switch: frame.water_switch,
            fan_switch: frame.fan_switch,
        })
    }

    /// Decodes one upload and appends it. Malformed frames never reach the
    /// store.
    pub async fn ingest(&self, payload: &[u8]) -> Result<TelemetryRecord, IngestError> {
        let frame = TelemetryFrame::decode_exact(payload, self.config.accept_crc_trailer)?;
        let mut record = self.to_record(&frame)?;

        record.id = self.gateway.append_telemetry(&record).await?;

        tracing::debug!(
            "stored telemetry of row {} at {}",
            record.row_id,
            record.recorded_at
        );

        Ok(record)
    }
}
