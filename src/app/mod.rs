//! Application module layer: port traits, the lifecycle controller and the
//! reference custom module.

pub mod controller;
pub mod custom;
pub mod ports;
