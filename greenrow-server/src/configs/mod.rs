mod schema;
mod settings;
mod storage;

pub use schema::SchemaManager;
pub use settings::{Codec, Database, Ingest, Logger, Notification, Retry, Server, Settings};
pub use storage::Storage;
