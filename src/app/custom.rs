//! Custom application module.
//!
//! Template for user applications: counts control-loop ticks from the
//! interrupt, runs an (empty) periodic body in its task, and exposes two
//! console commands that drive the gate-driver SPI chip select.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::info;

use crate::callbacks::TickEvent;
use crate::config::RuntimeConfig;
use crate::terminal::CommandEntry;

use super::ports::{AppModule, CommandHandler, GatePort, IsrSafe, MAX_MODULE_COMMANDS, ModuleFault};

/// Counts control-loop iterations.  Runs in interrupt context.
#[derive(Default)]
pub struct PwmTick {
    count: AtomicU64,
}

impl IsrSafe for PwmTick {
    fn on_tick(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }
}

/// `spi_cs_low` / `spi_cs_high` handler.
pub struct ChipSelectCommand<G: GatePort> {
    gate: Arc<G>,
    high: bool,
}

impl<G: GatePort> CommandHandler for ChipSelectCommand<G> {
    fn run(&self, _argv: &[&str]) {
        self.gate.set_chip_select(self.high);
        info!("Set CS {}", if self.high { "high" } else { "low" });
    }
}

pub struct CustomApp<G: GatePort + 'static> {
    tick: Arc<PwmTick>,
    cs_low: Arc<ChipSelectCommand<G>>,
    cs_high: Arc<ChipSelectCommand<G>>,
    iterations: AtomicU64,
}

impl<G: GatePort + 'static> CustomApp<G> {
    pub const NAME: &'static str = "App Custom";

    pub fn new(gate: Arc<G>) -> Self {
        Self {
            tick: Arc::new(PwmTick::default()),
            cs_low: Arc::new(ChipSelectCommand {
                gate: gate.clone(),
                high: false,
            }),
            cs_high: Arc::new(ChipSelectCommand { gate, high: true }),
            iterations: AtomicU64::new(0),
        }
    }

    /// Control-loop ticks seen since construction.
    pub fn ticks(&self) -> u64 {
        self.tick.count.load(Ordering::Relaxed)
    }

    /// Task iterations run since construction.
    pub fn iterations(&self) -> u64 {
        self.iterations.load(Ordering::Relaxed)
    }
}

impl<G: GatePort + 'static> AppModule for CustomApp<G> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn tick_handler(&self) -> Option<(TickEvent, Arc<dyn IsrSafe>)> {
        let handler: Arc<dyn IsrSafe> = self.tick.clone();
        Some((TickEvent::ControlLoop, handler))
    }

    fn commands(&self) -> heapless::Vec<CommandEntry, MAX_MODULE_COMMANDS> {
        let mut cmds = heapless::Vec::new();
        let _ = cmds.push(CommandEntry {
            name: "spi_cs_low",
            help_summary: "Set DRV SPI CS low",
            help_args: "",
            handler: self.cs_low.clone(),
        });
        let _ = cmds.push(CommandEntry {
            name: "spi_cs_high",
            help_summary: "Set DRV SPI CS high",
            help_args: "",
            handler: self.cs_high.clone(),
        });
        cmds
    }

    fn configure(&self, config: &RuntimeConfig) {
        info!("{}: period={}ms", Self::NAME, config.task_period_ms);
    }

    fn step(&self) -> Result<(), ModuleFault> {
        // Application logic goes here.
        self.iterations.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
