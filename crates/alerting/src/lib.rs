//! Alerting Core
//!
//! Provides the alert model, per-alert repeat suppression, the
//! active/resolved transition state machine and chat message formatting.

mod format;
mod manager;
mod model;

pub use format::{escape_markdown, format_alert, messages};
pub use manager::{process, Notification, NotificationEngine, NotificationState};
pub use model::{AlertKey, AlertRecord, AlertSnapshot};
