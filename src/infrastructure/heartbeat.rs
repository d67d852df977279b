use std::time::Duration;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Owned keep-alive scheduler for the gateway task.
///
/// The timer is only polled from the task that arms and disarms it, so once
/// [`disarm`](Self::disarm) returns no further tick can be observed.
pub struct HeartbeatTimer {
    period: Duration,
    interval: Option<Interval>,
}

impl HeartbeatTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            interval: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Starts delivering ticks every `period`, first one a full period from now.
    ///
    /// Arming an armed timer restarts it.
    pub fn arm(&mut self) {
        if self.is_armed() {
            tracing::warn!("[Heartbeat] Armed twice without disarm, restarting timer");
            self.disarm();
        }

        let mut interval = time::interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.interval = Some(interval);
        tracing::debug!("[Heartbeat] Armed with period {:?}", self.period);
    }

    /// Stops delivery. Returns whether the timer was armed.
    pub fn disarm(&mut self) -> bool {
        let was_armed = self.interval.take().is_some();
        if was_armed {
            tracing::debug!("[Heartbeat] Disarmed");
        }
        was_armed
    }

    pub fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    /// Resolves on the next tick; never resolves while disarmed.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}
