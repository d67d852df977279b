use std::time::Duration;

/// Reconnect backoff schedule.
///
/// Each call to [`next_delay`](Self::next_delay) advances one step; once the
/// schedule is exhausted its last entry repeats. An empty schedule means
/// reconnecting immediately.
#[derive(Debug, Clone)]
pub struct Timer {
    attempts: u32,
    intervals: Vec<u64>,
}

impl Timer {
    pub fn new(intervals: Vec<u64>) -> Self {
        Self {
            attempts: 0,
            intervals,
        }
    }

    /// Get the next delay duration
    pub fn next_delay(&mut self) -> Duration {
        let delay = self
            .intervals
            .get(self.attempts as usize)
            .or_else(|| self.intervals.last())
            .copied()
            .unwrap_or(0);

        self.attempts = self.attempts.saturating_add(1);
        Duration::from_millis(delay)
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Reset the timer
    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
