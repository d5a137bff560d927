//! Background task spawning with a fixed stack.
//!
//! Module tasks get a statically sized execution context: the stack size
//! is fixed at spawn and never grows.  On the firmware target `std::thread`
//! maps onto an RTOS task, so the same call covers both builds.

use std::thread::JoinHandle;

use crate::error::LifecycleError;

/// Spawn `f` as a named task with exactly `stack_kb` KiB of stack.
pub fn spawn_task(
    name: &'static str,
    stack_kb: usize,
    f: impl FnOnce() + Send + 'static,
) -> Result<JoinHandle<()>, LifecycleError> {
    log::info!("Spawning '{}' (stack={}KB)", name, stack_kb);

    std::thread::Builder::new()
        .name(name.into())
        .stack_size(stack_kb * 1024)
        .spawn(f)
        .map_err(|e| {
            log::error!("spawn_task: '{}' creation failed: {}", name, e);
            LifecycleError::SpawnFailed
        })
}
