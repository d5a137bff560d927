//! Runtime configuration parameters
//!
//! Tunables for the application module runtime. Handed to the module at
//! start and on every reconfiguration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Core runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    // --- Background task ---
    /// Sleep between task iterations (milliseconds). Bounds stop latency.
    pub task_period_ms: u32,
    /// Fixed stack size of the background task (KiB)
    pub task_stack_kb: u32,

    // --- Liveness ---
    /// Deadline for the liveness token refresh (milliseconds)
    pub liveness_timeout_ms: u32,

    // --- Simulation ---
    /// Rate of the simulated control-loop interrupt (Hz)
    pub control_loop_hz: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            task_period_ms: 10,
            task_stack_kb: 64,
            liveness_timeout_ms: 1000,
            control_loop_hz: 1000,
        }
    }
}

impl RuntimeConfig {
    /// Reject values that would break the stop-latency or liveness bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.task_period_ms == 0 {
            return Err(ConfigError::Invalid("task_period_ms must be non-zero"));
        }
        if self.task_stack_kb == 0 {
            return Err(ConfigError::Invalid("task_stack_kb must be non-zero"));
        }
        if self.liveness_timeout_ms <= self.task_period_ms {
            return Err(ConfigError::Invalid(
                "liveness_timeout_ms must exceed task_period_ms",
            ));
        }
        if self.control_loop_hz == 0 {
            return Err(ConfigError::Invalid("control_loop_hz must be non-zero"));
        }
        Ok(())
    }

    pub fn task_period(&self) -> core::time::Duration {
        core::time::Duration::from_millis(u64::from(self.task_period_ms))
    }
}
