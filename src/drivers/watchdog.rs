//! Software timeout (liveness token).
//!
//! The module task must call `feed()` (via [`LivenessPort::refresh`]) on
//! every iteration.  The surrounding firmware polls [`Watchdog::is_expired`]
//! and takes its safety action once the deadline passes without a refresh.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::app::ports::LivenessPort;

pub struct Watchdog {
    timeout: Duration,
    epoch: Instant,
    /// Milliseconds since `epoch` at the last feed.
    last_feed_ms: AtomicU64,
    feeds: AtomicU64,
}

impl Watchdog {
    /// Create an armed watchdog; the deadline starts counting now.
    pub fn new(timeout_ms: u32) -> Self {
        log::info!("Watchdog: armed ({}ms timeout)", timeout_ms);
        Self {
            timeout: Duration::from_millis(u64::from(timeout_ms)),
            epoch: Instant::now(),
            last_feed_ms: AtomicU64::new(0),
            feeds: AtomicU64::new(0),
        }
    }

    /// Reset the deadline.
    pub fn feed(&self) {
        self.last_feed_ms
            .store(self.elapsed_ms(), Ordering::Release);
        self.feeds.fetch_add(1, Ordering::Relaxed);
    }

    /// True once `timeout` has passed since the last feed.
    pub fn is_expired(&self) -> bool {
        let since = self
            .elapsed_ms()
            .saturating_sub(self.last_feed_ms.load(Ordering::Acquire));
        since > self.timeout.as_millis() as u64
    }

    /// Number of feeds since construction.
    pub fn feed_count(&self) -> u64 {
        self.feeds.load(Ordering::Relaxed)
    }

    fn elapsed_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

impl LivenessPort for Watchdog {
    fn refresh(&self) {
        self.feed();
    }
}
