use std::env;
use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use greenrow_api::ChecksumPolicy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    pub migration_path: Option<String>,
    pub clean_start: bool,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Period of the scheduler tick
    pub tick_interval_ms: u64,
    /// Extra ticks an armed payload is re-announced for
    pub redelivery_count: u8,
    /// Serve one channel for all rows next to the per-row channels
    pub broadcast_channel: bool,
}

impl Default for Notification {
    fn default() -> Self {
        Self {
            tick_interval_ms: 2000,
            redelivery_count: 2,
            broadcast_channel: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingest {
    /// Fixed offset added to device timestamps before they are stored
    pub utc_offset_secs: i64,
    /// Accept frames carrying the firmware's two byte checksum trailer
    pub accept_crc_trailer: bool,
}

impl Default for Ingest {
    fn default() -> Self {
        Self {
            utc_offset_secs: 3600,
            accept_crc_trailer: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Codec {
    pub checksum: ChecksumPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Retry {
    /// Total attempts per store operation, including the first one
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub multiplier: f64,
}

impl Default for Retry {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            initial_backoff_ms: 1000,
            max_backoff_ms: 5000,
            multiplier: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub logger: Logger,
    pub database: Database,
    #[serde(default)]
    pub notification: Notification,
    #[serde(default)]
    pub ingest: Ingest,
    #[serde(default)]
    pub codec: Codec,
    #[serde(default)]
    pub retry: Retry,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        let mut settings: Settings = Config::builder()
            .add_source(File::with_name("configs/default"))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(Environment::default().separator("__"))
            .build()?
            .try_deserialize()?;

        if let Some(migrate) = &settings.database.migration_path {
            if !Path::new(migrate).is_dir() {
                settings.database.migration_path = None;
            }
        }

        Ok(settings)
    }
}
