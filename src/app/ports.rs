//! Port traits: the boundary between the module runtime and the firmware
//! around it.
//!
//! ```text
//!   Control-loop ISR ──▶ IsrSafe        Console ──▶ CommandHandler
//!   Task loop        ──▶ LivenessPort   Handlers ──▶ GatePort
//! ```
//!
//! A pluggable application implements [`AppModule`]; the
//! [`ModuleController`](super::controller::ModuleController) drives it.

use std::sync::Arc;

use crate::callbacks::TickEvent;
use crate::config::RuntimeConfig;
use crate::terminal::CommandEntry;

/// Maximum number of console commands a single module may expose.
pub const MAX_MODULE_COMMANDS: usize = 8;

// ───────────────────────────────────────────────────────────────
// Interrupt-context handler
// ───────────────────────────────────────────────────────────────

/// Code allowed to run inside the control-loop interrupt.
///
/// `on_tick` runs with the slot's critical section held and preempts the
/// rest of the firmware.  Implementations must not block, must not
/// allocate, must finish in bounded time, and must never touch the
/// callback or command registries.  Atomics and lock-free queues only.
pub trait IsrSafe: Send + Sync {
    fn on_tick(&self);
}

// ───────────────────────────────────────────────────────────────
// Console command handler
// ───────────────────────────────────────────────────────────────

/// Handler behind one or more console command names.
///
/// `argv[0]` is the command name as typed.  Runs on the console context,
/// never in an interrupt.  Identity (`Arc::ptr_eq`) is what
/// [`CommandRegistry::unregister_by_handler`](crate::terminal::CommandRegistry::unregister_by_handler)
/// matches on.
pub trait CommandHandler: Send + Sync {
    fn run(&self, argv: &[&str]);
}

// ───────────────────────────────────────────────────────────────
// Liveness / timeout subsystem
// ───────────────────────────────────────────────────────────────

/// Watchdog-style token the module task refreshes every iteration.
pub trait LivenessPort: Send + Sync {
    fn refresh(&self);
}

// ───────────────────────────────────────────────────────────────
// Gate driver chip select
// ───────────────────────────────────────────────────────────────

/// SPI chip-select line of the gate driver.
pub trait GatePort: Send + Sync {
    /// Drive CS high (`true`) or low (`false`).
    fn set_chip_select(&self, high: bool);
}

// ───────────────────────────────────────────────────────────────
// Application module
// ───────────────────────────────────────────────────────────────

/// Failure reported by a module's per-iteration work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleFault {
    pub reason: &'static str,
}

impl core::fmt::Display for ModuleFault {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "module fault: {}", self.reason)
    }
}

/// A pluggable application module.
///
/// The controller asks for the tick handler and command set on every
/// start, so a module may hand out the same `Arc`s each time.
pub trait AppModule: Send + Sync + 'static {
    /// Owner name used for the callback slot and the task name.
    fn name(&self) -> &'static str;

    /// Interrupt handler to install, if the module wants one.
    fn tick_handler(&self) -> Option<(TickEvent, Arc<dyn IsrSafe>)>;

    /// Console commands to register while the module runs.
    fn commands(&self) -> heapless::Vec<CommandEntry, MAX_MODULE_COMMANDS>;

    /// Apply new runtime configuration.
    fn configure(&self, _config: &RuntimeConfig) {}

    /// One iteration of background work, called from the module task
    /// between liveness refreshes.
    fn step(&self) -> Result<(), ModuleFault>;
}
