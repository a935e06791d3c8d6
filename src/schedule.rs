use std::time::{Duration, Instant};

pub const RECONNECT_INTERVAL: Duration = Duration::from_secs(5);

/// Fires at most once per `period`, measured from the last time it fired.
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    last: Instant,
}

impl Ticker {
    pub fn new(period: Duration, now: Instant) -> Self {
        Self { period, last: now }
    }

    pub fn is_due(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last) >= self.period {
            self.last = now;
            true
        } else {
            false
        }
    }
}
