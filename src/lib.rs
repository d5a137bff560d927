//! Motor-controller application module runtime.
//!
//! Lets a pluggable application attach a handler to the control-loop
//! interrupt and commands to the operator console, and start/stop its
//! background task without touching the core control firmware.

pub mod app;
pub mod callbacks;
pub mod config;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod terminal;
