//! DRV8301 gate-driver chip-select line.
//!
//! On the host the pin is an atomic flag so tests and the console can
//! observe it.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::app::ports::GatePort;
use crate::pins;

pub struct ChipSelect {
    high: AtomicBool,
    writes: AtomicU32,
}

impl Default for ChipSelect {
    fn default() -> Self {
        Self::new()
    }
}

impl ChipSelect {
    /// CS idles high (deselected).
    pub const fn new() -> Self {
        Self {
            high: AtomicBool::new(true),
            writes: AtomicU32::new(0),
        }
    }

    pub fn is_high(&self) -> bool {
        self.high.load(Ordering::Acquire)
    }

    /// Number of writes to the pin.
    pub fn writes(&self) -> u32 {
        self.writes.load(Ordering::Relaxed)
    }
}

impl GatePort for ChipSelect {
    fn set_chip_select(&self, high: bool) {
        let (port, pin) = pins::DRV8301_CS;
        log::trace!("gate: P{:?}{} <- {}", port, pin, u8::from(high));
        self.high.store(high, Ordering::Release);
        self.writes.fetch_add(1, Ordering::Relaxed);
    }
}
