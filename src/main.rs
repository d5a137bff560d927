//! Motor-controller application runtime: host simulation entry point.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  Bring-up (pins, ADC ranks)        Control-loop ISR (sim)     │
//! │                                         │ invoke()            │
//! │  ─────────────── Registries ───────────▼────────────────     │
//! │   CallbackRegistry        CommandRegistry ◀── stdin console   │
//! │  ────────────────────────────────────────────────────────     │
//! │   ModuleController ──▶ CustomApp task ──▶ Watchdog            │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lines typed on stdin are dispatched as console commands.  `exit` or EOF
//! stops the module and shuts down.

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Result;
use log::{info, warn};

use motorapp::app::controller::ModuleController;
use motorapp::app::custom::CustomApp;
use motorapp::callbacks::CallbackRegistry;
use motorapp::config::RuntimeConfig;
use motorapp::drivers::gate::ChipSelect;
use motorapp::drivers::hw_init;
use motorapp::drivers::hw_timer::ControlLoopSim;
use motorapp::drivers::watchdog::Watchdog;
use motorapp::terminal::CommandRegistry;

static CALLBACKS: CallbackRegistry = CallbackRegistry::new();
static COMMANDS: CommandRegistry = CommandRegistry::new();

fn main() -> Result<()> {
    init_logging();
    info!("motorapp v{}", env!("CARGO_PKG_VERSION"));

    // ── 1. Peripheral bring-up ────────────────────────────────
    hw_init::configure_pins()?;
    hw_init::configure_sampling_channels()?;

    // ── 2. Control loop + liveness ────────────────────────────
    let config = RuntimeConfig::default();
    let mut control_loop = ControlLoopSim::start(&CALLBACKS, config.control_loop_hz)?;
    let watchdog = Arc::new(Watchdog::new(config.liveness_timeout_ms));

    // ── 3. Application module ─────────────────────────────────
    let gate = Arc::new(ChipSelect::new());
    let app = Arc::new(CustomApp::new(gate.clone()));
    let mut controller = ModuleController::new(
        app.clone(),
        &CALLBACKS,
        &COMMANDS,
        watchdog.clone(),
        config,
    )?;
    controller.start()?;

    // ── 4. Console ────────────────────────────────────────────
    info!("Console ready. Type 'help' for commands, 'exit' to quit.");
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed == "exit" {
            break;
        }
        if trimmed.is_empty() {
            continue;
        }
        if let Err(e) = COMMANDS.execute_line(trimmed) {
            warn!("{}: {}", trimmed, e);
        }
        if watchdog.is_expired() {
            warn!("liveness timeout expired (state={:?})", controller.state());
        }
    }

    // ── 5. Shutdown ───────────────────────────────────────────
    controller.stop()?;
    control_loop.stop();
    info!(
        "Shutdown: {} control ticks, {} task iterations, CS {}",
        app.ticks(),
        app.iterations(),
        if gate.is_high() { "high" } else { "low" }
    );
    Ok(())
}

/// `[LEVEL target] message`, level from `RUST_LOG` (default info).
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
