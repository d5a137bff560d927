//! Module lifecycle controller.
//!
//! Owns one application module, its background task and the two signals
//! shared with that task:
//!
//! - `stop_now`: written only by the controller, read by the task.
//! - `is_running`: written only by the task (entry/exit), read by the
//!   controller.
//!
//! ```text
//!            start()               task entered
//!  Stopped ──────────▶ Starting ──────────────▶ Running
//!     ▲                   │                       │  │ step() failed
//!     │    task joined    ▼        stop()         │  ▼
//!     └─────────────── Stopping ◀─────────────────┴─ Faulted
//! ```
//!
//! `stop()` tears down in a fixed order: clear the tick callback,
//! unregister the commands, raise `stop_now`, join the task.  No interrupt
//! tick or console command can reach the module once its task starts
//! unwinding, and by the time `stop()` returns neither path touches the
//! module again.

use core::cell::Cell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use log::{error, info, warn};

use crate::callbacks::{CallbackOwner, CallbackRegistry, TickEvent};
use crate::config::RuntimeConfig;
use crate::drivers::task_pin;
use crate::error::{LifecycleError, Result};
use crate::terminal::CommandRegistry;

use super::ports::{AppModule, CommandHandler, LivenessPort, MAX_MODULE_COMMANDS, ModuleFault};

// ---------------------------------------------------------------------------
// Module state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ModuleState {
    Stopped = 0,
    Starting = 1,
    Running = 2,
    Stopping = 3,
    /// The task exited on a fault; entry points stay registered until
    /// `stop()`.
    Faulted = 4,
}

impl ModuleState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Stopped,
            1 => Self::Starting,
            2 => Self::Running,
            3 => Self::Stopping,
            4 => Self::Faulted,
            _ => {
                debug_assert!(false, "invalid module state: {raw}");
                Self::Faulted
            }
        }
    }
}

// ---------------------------------------------------------------------------
// State shared with the task
// ---------------------------------------------------------------------------

struct TaskShared {
    stop_now: AtomicBool,
    is_running: AtomicBool,
    state: AtomicU8,
    fault: Mutex<CriticalSectionRawMutex, Cell<Option<ModuleFault>>>,
}

impl TaskShared {
    fn new() -> Self {
        Self {
            stop_now: AtomicBool::new(true),
            is_running: AtomicBool::new(false),
            state: AtomicU8::new(ModuleState::Stopped as u8),
            fault: Mutex::new(Cell::new(None)),
        }
    }

    fn state(&self) -> ModuleState {
        ModuleState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: ModuleState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Move `from` → `to` only if nobody else moved the state first.
    fn transition(&self, from: ModuleState, to: ModuleState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn record_fault(&self, fault: ModuleFault) {
        self.fault.lock(|f| f.set(Some(fault)));
    }

    fn fault(&self) -> Option<ModuleFault> {
        self.fault.lock(Cell::get)
    }
}

/// Clears `is_running` when the task body exits, including by unwinding.
struct RunningGuard<'a>(&'a AtomicBool);

impl<'a> RunningGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Starts and stops one [`AppModule`] against a pair of registries.
pub struct ModuleController<'h, M: AppModule> {
    module: Arc<M>,
    callbacks: &'h CallbackRegistry,
    commands: &'h CommandRegistry,
    liveness: Arc<dyn LivenessPort>,
    config: RuntimeConfig,
    shared: Arc<TaskShared>,
    /// Slot identity of this controller; distinct per instance.
    owner: CallbackOwner,
    /// Tick event this controller installed, if any.
    installed: Option<TickEvent>,
    /// Distinct command handlers this controller registered.
    registered: heapless::Vec<Arc<dyn CommandHandler>, MAX_MODULE_COMMANDS>,
    task: Option<JoinHandle<()>>,
}

impl<'h, M: AppModule> ModuleController<'h, M> {
    /// Validates `config`.  Does **not** start the module.
    pub fn new(
        module: Arc<M>,
        callbacks: &'h CallbackRegistry,
        commands: &'h CommandRegistry,
        liveness: Arc<dyn LivenessPort>,
        config: RuntimeConfig,
    ) -> Result<Self> {
        config.validate()?;
        let owner = CallbackOwner::new(module.name());
        Ok(Self {
            module,
            callbacks,
            commands,
            liveness,
            config,
            owner,
            shared: Arc::new(TaskShared::new()),
            installed: None,
            registered: heapless::Vec::new(),
            task: None,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Register the module's entry points and spawn its task.
    ///
    /// Fails with [`LifecycleError::AlreadyRunning`] unless `Stopped`.  Any
    /// failure part-way through undoes every registration made so far and
    /// leaves the module `Stopped`.
    pub fn start(&mut self) -> Result<()> {
        let name = self.module.name();
        if self.state() != ModuleState::Stopped {
            warn!("{}: start() while {:?}", name, self.state());
            return Err(LifecycleError::AlreadyRunning.into());
        }

        self.module.configure(&self.config);

        if let Err(e) = self.register_entry_points() {
            warn!("{}: registration failed ({}), rolling back", name, e);
            self.release_entry_points();
            return Err(e);
        }

        self.shared.stop_now.store(false, Ordering::Release);
        self.shared.fault.lock(|f| f.set(None));
        self.shared.set_state(ModuleState::Starting);

        let module = Arc::clone(&self.module);
        let shared = Arc::clone(&self.shared);
        let liveness = Arc::clone(&self.liveness);
        let period = self.config.task_period();
        let spawned = task_pin::spawn_task(name, self.config.task_stack_kb as usize, move || {
            run_task(&*module, &shared, &*liveness, period);
        });

        match spawned {
            Ok(handle) => {
                self.task = Some(handle);
                info!("{}: started", name);
                Ok(())
            }
            Err(e) => {
                self.release_entry_points();
                self.shared.stop_now.store(true, Ordering::Release);
                self.shared.set_state(ModuleState::Stopped);
                Err(e.into())
            }
        }
    }

    /// Disable the entry points, signal the task and wait for it to exit.
    ///
    /// Fails with [`LifecycleError::NotRunning`] if already `Stopped`.
    /// Blocks for at most one task period plus scheduling jitter.
    pub fn stop(&mut self) -> Result<()> {
        let name = self.module.name();
        let state = self.state();
        if state == ModuleState::Stopped {
            warn!("{}: stop() while Stopped", name);
            return Err(LifecycleError::NotRunning.into());
        }

        // Entry points first: nothing external may reach the module while
        // its task unwinds.
        self.release_entry_points();

        self.shared.stop_now.store(true, Ordering::Release);
        if state != ModuleState::Faulted {
            self.shared.set_state(ModuleState::Stopping);
        }

        if let Some(task) = self.task.take() {
            if task.join().is_err() {
                error!("{}: task terminated abnormally", name);
                self.shared.record_fault(ModuleFault {
                    reason: "task terminated abnormally",
                });
            }
        }
        debug_assert!(!self.shared.is_running.load(Ordering::Acquire));

        self.shared.set_state(ModuleState::Stopped);
        info!("{}: stopped", name);
        Ok(())
    }

    /// Replace the runtime configuration and hand it to the module.
    ///
    /// Task period and stack size take effect on the next `start()`.
    pub fn configure(&mut self, config: RuntimeConfig) -> Result<()> {
        config.validate()?;
        self.module.configure(&config);
        self.config = config;
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> ModuleState {
        self.shared.state()
    }

    /// The task-owned running flag.
    pub fn is_running(&self) -> bool {
        self.shared.is_running.load(Ordering::Acquire)
    }

    /// Last fault reported by the task since the most recent `start()`.
    pub fn fault(&self) -> Option<ModuleFault> {
        self.shared.fault()
    }

    pub fn module(&self) -> &Arc<M> {
        &self.module
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn register_entry_points(&mut self) -> Result<()> {
        if let Some((event, handler)) = self.module.tick_handler() {
            self.callbacks.install(event, self.owner, handler)?;
            self.installed = Some(event);
        }

        for entry in self.module.commands() {
            let handler = Arc::clone(&entry.handler);
            self.commands
                .register(entry.name, entry.help_summary, entry.help_args, entry.handler)?;
            if !self.registered.iter().any(|h| Arc::ptr_eq(h, &handler)) {
                // Capacity equals the module's command set, so this cannot fail.
                let _ = self.registered.push(handler);
            }
        }
        Ok(())
    }

    fn release_entry_points(&mut self) {
        if let Some(event) = self.installed.take() {
            self.callbacks.clear(event, self.owner);
        }
        for handler in &self.registered {
            self.commands.unregister_by_handler(handler);
        }
        self.registered.clear();
    }
}

impl<M: AppModule> Drop for ModuleController<'_, M> {
    fn drop(&mut self) {
        if self.state() != ModuleState::Stopped {
            let _ = self.stop();
        }
    }
}

// ---------------------------------------------------------------------------
// Task body
// ---------------------------------------------------------------------------

fn run_task<M: AppModule>(
    module: &M,
    shared: &TaskShared,
    liveness: &dyn LivenessPort,
    period: Duration,
) {
    let _running = RunningGuard::enter(&shared.is_running);
    shared.transition(ModuleState::Starting, ModuleState::Running);

    loop {
        if shared.stop_now.load(Ordering::Acquire) {
            return;
        }

        liveness.refresh();

        let outcome = catch_unwind(AssertUnwindSafe(|| module.step())).unwrap_or(Err(ModuleFault {
            reason: "task body panicked",
        }));
        if let Err(fault) = outcome {
            error!("{}: {}", module.name(), fault);
            shared.record_fault(fault);
            shared.transition(ModuleState::Running, ModuleState::Faulted);
            return;
        }

        std::thread::sleep(period);
    }
}
