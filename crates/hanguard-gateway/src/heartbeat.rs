//! Broadcast hello scheduling.
//!
//! The gateway broadcasts a time-sync hello frame on a fixed interval,
//! independent of inbound traffic. The scheduler only tracks *when* a hello
//! is owed; the dispatcher checks it on every loop pass, so hello emission
//! is never blocked by (or blocking on) frame reads. Jitter is bounded by
//! the transport read timeout, which is orders of magnitude below the
//! interval.

use std::time::Duration;
use tokio::time::Instant;

use hanguard_core::constants::HELLO_INTERVAL_SECS;

/// Tracks when the next broadcast hello is due.
#[derive(Debug)]
pub struct HeartbeatScheduler {
    interval: Duration,
    last_hello_at: Option<Instant>,
}

impl HeartbeatScheduler {
    /// Scheduler with a custom interval.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_hello_at: None,
        }
    }

    /// The configured interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a hello is owed at `now`. Always true before the first one,
    /// so the gateway announces itself immediately at startup.
    #[must_use]
    pub fn due(&self, now: Instant) -> bool {
        match self.last_hello_at {
            None => true,
            Some(last) => now.duration_since(last) >= self.interval,
        }
    }

    /// Record that a hello went out at `now`.
    pub fn mark_sent(&mut self, now: Instant) {
        self.last_hello_at = Some(now);
    }
}

impl Default for HeartbeatScheduler {
    fn default() -> Self {
        Self::new(Duration::from_secs(HELLO_INTERVAL_SECS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_immediately_when_unset() {
        let scheduler = HeartbeatScheduler::new(Duration::from_secs(600));
        assert!(scheduler.due(Instant::now()));
    }

    #[test]
    fn test_not_due_within_interval() {
        let mut scheduler = HeartbeatScheduler::new(Duration::from_secs(600));
        let t0 = Instant::now();
        scheduler.mark_sent(t0);

        assert!(!scheduler.due(t0 + Duration::from_secs(1)));
        assert!(!scheduler.due(t0 + Duration::from_secs(599)));
    }

    #[test]
    fn test_due_after_interval() {
        let mut scheduler = HeartbeatScheduler::new(Duration::from_secs(600));
        let t0 = Instant::now();
        scheduler.mark_sent(t0);

        assert!(scheduler.due(t0 + Duration::from_secs(600)));
        assert!(scheduler.due(t0 + Duration::from_secs(3600)));
    }
}
