//! Polling Scheduler Implementation

use alert_source::AlertSource;
use alerting::{AlertSnapshot, Notification, NotificationEngine, NotificationState};
use notifier::{deliver, Notifier};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// What a failed fetch means for notification state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchFailurePolicy {
    /// Skip the tick and leave state untouched
    #[default]
    Hold,
    /// Process an empty snapshot, which may announce a resolution
    TreatAsEmpty,
}

/// Configuration for the polling scheduler
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Time between the starts of two ticks
    pub poll_interval: Duration,
    /// Minimum time between two notifications for the same alert
    pub repeat_interval: Duration,
    /// Handling of failed fetches
    pub on_fetch_error: FetchFailurePolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            repeat_interval: Duration::from_secs(600),
            on_fetch_error: FetchFailurePolicy::Hold,
        }
    }
}

/// Outcome of a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Alerts in the fetched snapshot, `None` if the fetch failed
    pub fetched: Option<usize>,
    /// Messages delivered
    pub sent: usize,
    /// Messages that failed to deliver
    pub failed: usize,
}

/// Polling loop owning the notification state
pub struct Scheduler {
    config: SchedulerConfig,
    engine: NotificationEngine,
    ticks: u64,
}

impl Scheduler {
    /// Create a scheduler with empty notification state
    pub fn new(config: SchedulerConfig) -> Self {
        info!(
            "Alert scheduler created: poll every {:?}, repeat after {:?}, on fetch error {:?}",
            config.poll_interval, config.repeat_interval, config.on_fetch_error
        );
        Self {
            engine: NotificationEngine::new(config.repeat_interval),
            config,
            ticks: 0,
        }
    }

    /// Run one fetch → process → deliver cycle
    pub async fn tick<S, N>(&mut self, source: &S, notifier: &N) -> TickReport
    where
        S: AlertSource + ?Sized,
        N: Notifier + ?Sized,
    {
        self.ticks += 1;
        let mut report = TickReport::default();

        let snapshot = match source.fetch().await {
            Ok(snapshot) => {
                report.fetched = Some(snapshot.len());
                snapshot
            }
            Err(e) => match self.config.on_fetch_error {
                FetchFailurePolicy::Hold => {
                    warn!("Tick {}: fetch failed, keeping previous state ({})", self.ticks, e);
                    return report;
                }
                FetchFailurePolicy::TreatAsEmpty => {
                    warn!("Tick {}: fetch failed, treating as no alerts ({})", self.ticks, e);
                    AlertSnapshot::empty()
                }
            },
        };

        let notifications = self.engine.process(&snapshot, Instant::now().into_std());

        for notification in &notifications {
            let context = match notification {
                Notification::Alert(_) => "alert",
                Notification::Resolved => "resolved",
                Notification::Stable => "stable",
            };
            if deliver(notifier, &notification.render(), context).await {
                report.sent += 1;
            } else {
                report.failed += 1;
            }
        }

        debug!(
            "Tick {}: {:?} alerts, {} sent, {} failed",
            self.ticks, report.fetched, report.sent, report.failed
        );
        report
    }

    /// Tick on the configured interval until `shutdown` resolves
    ///
    /// The first tick runs immediately. Ticks never overlap; a slow tick
    /// delays the next one instead of bursting to catch up.
    pub async fn run<S, N, F>(&mut self, source: &S, notifier: &N, shutdown: F)
    where
        S: AlertSource + ?Sized,
        N: Notifier + ?Sized,
        F: Future<Output = ()>,
    {
        info!("Starting alert scheduler");
        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = interval.tick() => {
                    self.tick(source, notifier).await;
                }
            }
        }

        info!("Alert scheduler stopped after {} ticks", self.ticks);
    }

    /// Current notification state
    pub fn state(&self) -> &NotificationState {
        self.engine.state()
    }

    /// Number of ticks run so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
