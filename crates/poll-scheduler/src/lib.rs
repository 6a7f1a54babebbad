//! Alert Polling Scheduler
//!
//! Drives fetch → suppression → delivery on a fixed interval and owns the
//! notification state for the lifetime of the process.

mod scheduler;

pub use scheduler::{FetchFailurePolicy, Scheduler, SchedulerConfig, TickReport};
