use std::time::{Duration, Instant};

/// Reporting cadence. The interval is a lower bound: a tick is due
/// at the first poll strictly past the interval, and the next interval
/// only starts once the tick has been served.
#[derive(Debug, Copy, Clone)]
pub struct Scheduler {
    /// Reporting interval
    interval: Duration,

    /// Last time a tick was served
    last: Instant,
}

impl Scheduler {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last: now,
        }
    }

    /// True when a reporting tick is due
    pub fn is_due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last) > self.interval
    }

    /// Starts a new interval, call this once the tick has been served
    pub fn rearm(&mut self, now: Instant) {
        self.last = now;
    }
}

#[cfg(test)]
mod test {
    use super::Scheduler;
    use std::time::{Duration, Instant};

    #[test]
    fn soft_interval() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new(Duration::from_millis(2000), t0);

        assert!(!scheduler.is_due(t0));
        assert!(!scheduler.is_due(t0 + Duration::from_millis(1999)));
        assert!(!scheduler.is_due(t0 + Duration::from_millis(2000)));
        assert!(scheduler.is_due(t0 + Duration::from_millis(2001)));

        // tick served late: next interval counts from the end of the tick
        let served = t0 + Duration::from_millis(2500);
        scheduler.rearm(served);

        assert!(!scheduler.is_due(t0 + Duration::from_millis(4001)));
        assert!(scheduler.is_due(served + Duration::from_millis(2001)));
    }
}
