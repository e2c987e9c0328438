mod scheduler;
mod state;

pub use scheduler::{Notification, NotificationScheduler, TickOutcome};
pub use state::{ChannelKey, NotificationChannelState, Phase, RequestKind, Watermarks};
