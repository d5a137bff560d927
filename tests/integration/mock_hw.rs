//! Mock collaborators for integration tests.
//!
//! Records every gate write and liveness refresh, and provides small
//! configurable modules so tests can drive the controller through its
//! failure paths without real hardware.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use motorapp::app::ports::{
    AppModule, CommandHandler, GatePort, IsrSafe, LivenessPort, MAX_MODULE_COMMANDS, ModuleFault,
};
use motorapp::callbacks::{CallbackRegistry, TickEvent};
use motorapp::config::RuntimeConfig;
use motorapp::terminal::{CommandEntry, CommandRegistry};

// ── Registries ────────────────────────────────────────────────

/// Fresh registries that live for the rest of the test process.
pub fn registries() -> (&'static CallbackRegistry, &'static CommandRegistry) {
    (
        Box::leak(Box::new(CallbackRegistry::new())),
        Box::leak(Box::new(CommandRegistry::new())),
    )
}

/// 1 ms task period so stop latency stays small in tests.
pub fn fast_config() -> RuntimeConfig {
    RuntimeConfig {
        task_period_ms: 1,
        task_stack_kb: 64,
        liveness_timeout_ms: 100,
        ..RuntimeConfig::default()
    }
}

// ── MockGate ──────────────────────────────────────────────────

#[derive(Default)]
pub struct MockGate {
    pub writes: Mutex<Vec<bool>>,
}

#[allow(dead_code)]
impl MockGate {
    pub fn last(&self) -> Option<bool> {
        self.writes.lock().unwrap().last().copied()
    }

    pub fn count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }
}

impl GatePort for MockGate {
    fn set_chip_select(&self, high: bool) {
        self.writes.lock().unwrap().push(high);
    }
}

// ── MockLiveness ──────────────────────────────────────────────

#[derive(Default)]
pub struct MockLiveness {
    refreshes: AtomicU64,
}

#[allow(dead_code)]
impl MockLiveness {
    pub fn count(&self) -> u64 {
        self.refreshes.load(Ordering::Relaxed)
    }
}

impl LivenessPort for MockLiveness {
    fn refresh(&self) {
        self.refreshes.fetch_add(1, Ordering::Relaxed);
    }
}

// ── TestModule ────────────────────────────────────────────────

#[derive(Default)]
pub struct TickCounter(AtomicU32);

#[allow(dead_code)]
impl TickCounter {
    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }
}

impl IsrSafe for TickCounter {
    fn on_tick(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Default)]
pub struct CallCounter(AtomicU32);

#[allow(dead_code)]
impl CallCounter {
    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }
}

impl CommandHandler for CallCounter {
    fn run(&self, _argv: &[&str]) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

/// How [`TestModule::step`] behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepBehaviour {
    Ok,
    /// Fail once this many iterations have completed.
    FailAfter(u64),
    /// Panic once this many iterations have completed.
    PanicAfter(u64),
}

/// Configurable module: one tick handler, one command handler behind
/// every name in `command_names`.
pub struct TestModule {
    pub name: &'static str,
    pub event: Option<TickEvent>,
    pub command_names: &'static [&'static str],
    pub behaviour: StepBehaviour,
    pub tick: Arc<TickCounter>,
    pub cmd: Arc<CallCounter>,
    pub steps: AtomicU64,
}

#[allow(dead_code)]
impl TestModule {
    pub fn new(name: &'static str, command_names: &'static [&'static str]) -> Self {
        Self {
            name,
            event: Some(TickEvent::ControlLoop),
            command_names,
            behaviour: StepBehaviour::Ok,
            tick: Arc::new(TickCounter::default()),
            cmd: Arc::new(CallCounter::default()),
            steps: AtomicU64::new(0),
        }
    }

    pub fn with_behaviour(mut self, behaviour: StepBehaviour) -> Self {
        self.behaviour = behaviour;
        self
    }

    pub fn steps(&self) -> u64 {
        self.steps.load(Ordering::Relaxed)
    }
}

impl AppModule for TestModule {
    fn name(&self) -> &'static str {
        self.name
    }

    fn tick_handler(&self) -> Option<(TickEvent, Arc<dyn IsrSafe>)> {
        let handler: Arc<dyn IsrSafe> = self.tick.clone();
        self.event.map(|e| (e, handler))
    }

    fn commands(&self) -> heapless::Vec<CommandEntry, MAX_MODULE_COMMANDS> {
        self.command_names
            .iter()
            .map(|&name| CommandEntry {
                name,
                help_summary: "test command",
                help_args: "[args]",
                handler: self.cmd.clone(),
            })
            .collect()
    }

    fn step(&self) -> Result<(), ModuleFault> {
        let done = self.steps.fetch_add(1, Ordering::Relaxed);
        match self.behaviour {
            StepBehaviour::Ok => Ok(()),
            StepBehaviour::FailAfter(n) if done >= n => Err(ModuleFault {
                reason: "injected failure",
            }),
            StepBehaviour::PanicAfter(n) if done >= n => panic!("injected panic"),
            _ => Ok(()),
        }
    }
}
