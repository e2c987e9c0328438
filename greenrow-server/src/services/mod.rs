pub mod gateway;
pub mod notification;

mod ingest_service;
mod retry_policy;

pub use gateway::{PersistenceGateway, RequestScope, SqliteGateway};
pub use ingest_service::*;
pub use notification::{ChannelKey, Notification, NotificationScheduler, TickOutcome};
pub use retry_policy::*;
