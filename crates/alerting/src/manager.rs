//! Notification Engine
//!
//! Decides, per polling tick, which alerts must be (re)notified and when the
//! aggregate "alerts active" / "all clear" transition is announced.

use crate::format::{format_alert, messages};
use crate::model::{AlertKey, AlertRecord, AlertSnapshot};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Outbound message decided by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A firing alert that is new or due for a repeat
    Alert(AlertRecord),
    /// Every previously active alert has cleared
    Resolved,
    /// Follows [`Notification::Resolved`]
    Stable,
}

impl Notification {
    /// Chat text for this notification
    pub fn render(&self) -> String {
        match self {
            Notification::Alert(alert) => format_alert(alert),
            Notification::Resolved => messages::RESOLVED.to_string(),
            Notification::Stable => messages::STABLE.to_string(),
        }
    }
}

/// Repeat-suppression memory carried from one tick to the next
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationState {
    /// Last delivery time per alert
    pub last_sent: HashMap<AlertKey, Instant>,
    /// Whether the previous tick observed at least one alert
    pub alerts_active: bool,
}

impl NotificationState {
    /// Last time a notification for `key` was emitted
    pub fn last_sent(&self, key: &AlertKey) -> Option<Instant> {
        self.last_sent.get(key).copied()
    }

    fn is_due(&self, key: &AlertKey, now: Instant, repeat_interval: Duration) -> bool {
        match self.last_sent.get(key) {
            Some(sent) => now.saturating_duration_since(*sent) >= repeat_interval,
            None => true,
        }
    }
}

/// Compute the notifications for one snapshot and the state for the next tick
///
/// The repeat clock runs from the last emission for an alert, keyed by
/// name and instance only. A non-empty to empty transition clears all
/// suppression memory and emits `Resolved` followed by `Stable`.
pub fn process(
    snapshot: &AlertSnapshot,
    mut state: NotificationState,
    now: Instant,
    repeat_interval: Duration,
) -> (Vec<Notification>, NotificationState) {
    let mut out = Vec::new();

    if !snapshot.is_empty() {
        if !state.alerts_active {
            info!("Alerts became active ({} firing)", snapshot.len());
            state.alerts_active = true;
        }

        for (key, alert) in latest_per_key(snapshot) {
            if state.is_due(&key, now, repeat_interval) {
                debug!("Notifying alert {}", key);
                state.last_sent.insert(key, now);
                out.push(Notification::Alert(alert.clone()));
            } else {
                debug!("Alert {} suppressed: notified less than {:?} ago", key, repeat_interval);
            }
        }
    } else if state.alerts_active {
        info!("All alerts resolved, clearing {} suppression entries", state.last_sent.len());
        state.alerts_active = false;
        state.last_sent.clear();
        out.push(Notification::Resolved);
        out.push(Notification::Stable);
    }

    (out, state)
}

/// One record per key in first-seen order, carrying the last record seen for it
fn latest_per_key(snapshot: &AlertSnapshot) -> Vec<(AlertKey, &AlertRecord)> {
    let mut position: HashMap<AlertKey, usize> = HashMap::new();
    let mut out: Vec<(AlertKey, &AlertRecord)> = Vec::with_capacity(snapshot.len());

    for alert in snapshot {
        let key = alert.key();
        match position.get(&key) {
            Some(&index) => {
                debug!("Duplicate alert {} in snapshot, keeping the later record", key);
                out[index].1 = alert;
            }
            None => {
                position.insert(key.clone(), out.len());
                out.push((key, alert));
            }
        }
    }
    out
}

/// Engine owning its state between ticks
#[derive(Debug)]
pub struct NotificationEngine {
    /// Minimum time between two notifications for the same alert
    repeat_interval: Duration,
    /// State carried across ticks
    state: NotificationState,
}

impl NotificationEngine {
    /// Create an engine with empty state
    pub fn new(repeat_interval: Duration) -> Self {
        info!("Creating notification engine with repeat interval {:?}", repeat_interval);
        Self {
            repeat_interval,
            state: NotificationState::default(),
        }
    }

    /// Process one snapshot observed at `now`
    pub fn process(&mut self, snapshot: &AlertSnapshot, now: Instant) -> Vec<Notification> {
        let state = std::mem::take(&mut self.state);
        let (notifications, state) = process(snapshot, state, now, self.repeat_interval);
        self.state = state;
        notifications
    }

    /// Current state
    pub fn state(&self) -> &NotificationState {
        &self.state
    }

    /// Whether alerts were active at the last processed tick
    pub fn alerts_active(&self) -> bool {
        self.state.alerts_active
    }

    pub fn repeat_interval(&self) -> Duration {
        self.repeat_interval
    }
}
