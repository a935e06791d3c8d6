use std::time::{Duration, Instant};

use log::{error, info};

use crate::schedule::Ticker;

/// A network connection that can drop and be brought back up.
pub trait Link {
    fn is_up(&mut self) -> bool;
    fn reconnect(&mut self) -> anyhow::Result<()>;
}

/// Retries a down link at most once per period, never giving up.
#[derive(Debug)]
pub struct LinkSupervisor {
    ticker: Ticker,
}

impl LinkSupervisor {
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            ticker: Ticker::new(period, now),
        }
    }

    /// Returns whether the link is up after this call.
    pub fn maintain<L: Link>(&mut self, link: &mut L, now: Instant) -> bool {
        if link.is_up() {
            return true;
        }

        if !self.ticker.is_due(now) {
            return false;
        }

        info!("Link down, reconnecting...");
        if let Err(e) = link.reconnect() {
            error!("Reconnect failed: {e}");
        }

        link.is_up()
    }
}
