//! Recurring module timers

use crate::module::TimerSchedule;
use log::debug;
use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Shortest repeat interval accepted; tokio rejects zero periods.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// A host-driven recurring timer with an initial delay.
///
/// After [`RecurringTimer::cancel`] the interval is dropped and `tick` never
/// completes again, so a cancelled timer cannot fire.
#[derive(Debug)]
pub struct RecurringTimer {
    interval: Option<Interval>,
    cancelled: bool,
}

impl RecurringTimer {
    /// Must be called from within a tokio runtime.
    pub fn start(schedule: TimerSchedule) -> Self {
        let period = schedule.interval.max(MIN_INTERVAL);
        let mut interval = interval_at(Instant::now() + schedule.initial_delay, period);
        // Skip missed ticks to avoid bursts after a stall
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        debug!(
            "Timer scheduled: first tick in {:?}, then every {:?}",
            schedule.initial_delay, period
        );
        Self {
            interval: Some(interval),
            cancelled: false,
        }
    }

    pub async fn tick(&mut self) {
        if self.cancelled {
            return std::future::pending().await;
        }
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending().await,
        }
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.interval = None;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}
