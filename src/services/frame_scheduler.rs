use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{interval, Interval, MissedTickBehavior};

/// Single-slot pending-tick flag.
///
/// Any number of requests before the next tick collapse into one pending
/// recomputation. The flag is cleared only once that recomputation has run.
#[derive(Debug, Default, Clone)]
pub struct FrameScheduler {
    scheduled: bool,
    requests: u64,
    runs: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a recomputation. Returns `true` if this request scheduled a
    /// new tick, `false` if one was already pending.
    pub fn request(&mut self) -> bool {
        self.requests += 1;
        if self.scheduled {
            return false;
        }
        self.scheduled = true;
        true
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    /// Clear the flag after the pending recomputation finished.
    pub fn mark_ran(&mut self) {
        self.scheduled = false;
        self.runs += 1;
    }

    /// Total requests seen, coalesced or not.
    pub fn requests(&self) -> u64 {
        self.requests
    }

    /// Recomputations actually run.
    pub fn runs(&self) -> u64 {
        self.runs
    }
}

/// Source of display-refresh ticks.
#[async_trait]
pub trait FrameClock: Send {
    async fn next_tick(&mut self);
}

/// Clock ticking at a fixed interval. Late ticks are skipped, not bunched.
pub struct IntervalClock {
    interval: Interval,
}

impl IntervalClock {
    /// Must be called from within a tokio runtime.
    pub fn new(period: Duration) -> Self {
        let mut interval = interval(period.max(Duration::from_millis(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }
}

#[async_trait]
impl FrameClock for IntervalClock {
    async fn next_tick(&mut self) {
        self.interval.tick().await;
    }
}

/// Clock that never waits, for driving frames by hand.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateClock;

#[async_trait]
impl FrameClock for ImmediateClock {
    async fn next_tick(&mut self) {
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_coalesce() {
        let mut scheduler = FrameScheduler::new();
        assert!(scheduler.request());
        for _ in 0..9 {
            assert!(!scheduler.request());
        }
        assert!(scheduler.is_scheduled());
        assert_eq!(scheduler.requests(), 10);

        scheduler.mark_ran();
        assert!(!scheduler.is_scheduled());
        assert_eq!(scheduler.runs(), 1);
        assert!(scheduler.request());
    }

    #[tokio::test]
    async fn test_interval_clock_ticks() {
        let mut clock = IntervalClock::from_millis(5);
        let start = tokio::time::Instant::now();
        clock.next_tick().await; // first tick is immediate
        clock.next_tick().await;
        clock.next_tick().await;
        assert!(start.elapsed() >= Duration::from_millis(9));
    }
}
