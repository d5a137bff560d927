//! Peripheral drivers and collaborators of the module runtime.

pub mod gate;
pub mod hw_init;
pub mod hw_timer;
pub mod task_pin;
pub mod watchdog;
