//! Simulated control-loop interrupt.
//!
//! On hardware the PWM timer's update interrupt drives the control loop and
//! calls into the [`CallbackRegistry`] once per iteration.  On the host a
//! dedicated thread stands in for that interrupt: each period it raises
//! [`TickEvent::AdcSample`] followed by [`TickEvent::ControlLoop`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use log::info;

use crate::callbacks::{CallbackRegistry, TickEvent};

/// Handle to a running control-loop simulator.
pub struct ControlLoopSim {
    stop: Arc<AtomicBool>,
    cycles: Arc<AtomicU64>,
    thread: Option<JoinHandle<()>>,
}

impl ControlLoopSim {
    /// Start raising tick events at `rate_hz`.
    pub fn start(registry: &'static CallbackRegistry, rate_hz: u32) -> std::io::Result<Self> {
        let period = Duration::from_micros(1_000_000 / u64::from(rate_hz.max(1)));
        let stop = Arc::new(AtomicBool::new(false));
        let cycles = Arc::new(AtomicU64::new(0));

        let thread = {
            let stop = stop.clone();
            let cycles = cycles.clone();
            std::thread::Builder::new()
                .name("control-isr".into())
                .spawn(move || {
                    while !stop.load(Ordering::Acquire) {
                        registry.invoke(TickEvent::AdcSample);
                        registry.invoke(TickEvent::ControlLoop);
                        cycles.fetch_add(1, Ordering::Relaxed);
                        std::thread::sleep(period);
                    }
                })?
        };

        info!("hw_timer(sim): control loop @ {}Hz started", rate_hz);
        Ok(Self {
            stop,
            cycles,
            thread: Some(thread),
        })
    }

    /// Control-loop iterations raised so far.
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    /// Stop raising events and wait for the simulator thread.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(t) = self.thread.take() {
            if t.join().is_err() {
                log::error!("hw_timer(sim): simulator thread panicked");
            }
            info!("hw_timer(sim): stopped after {} cycles", self.cycles());
        }
    }
}

impl Drop for ControlLoopSim {
    fn drop(&mut self) {
        self.stop();
    }
}
