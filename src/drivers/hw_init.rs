//! One-shot hardware peripheral bring-up.
//!
//! Applies the pin-mode and ADC rank tables from [`pins`](crate::pins).
//! Called once from `main()` before any application module starts; the
//! module runtime only relies on the postcondition that both calls
//! succeeded.  On the host the register writes are skipped and only the
//! tables are checked.

use log::info;

use crate::pins;

// ── Table types ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    A,
    B,
    C,
    D,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    OutputPushPull,
    /// Alternate function routed to TIM1, floating, highest speed.
    AlternateTim1,
    InputPullUp,
    InputAnalog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinConfig {
    pub port: Port,
    pub pin: u8,
    pub mode: PinMode,
    pub label: &'static str,
}

impl PinConfig {
    pub const fn new(port: Port, pin: u8, mode: PinMode, label: &'static str) -> Self {
        Self {
            port,
            pin,
            mode,
            label,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcUnit {
    Adc1,
    Adc2,
    Adc3,
}

/// One channel placed at a rank of a conversion sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdcRank {
    pub unit: AdcUnit,
    pub channel: u8,
    pub rank: u8,
    pub injected: bool,
}

impl AdcRank {
    pub const fn regular(unit: AdcUnit, channel: u8, rank: u8) -> Self {
        Self {
            unit,
            channel,
            rank,
            injected: false,
        }
    }

    pub const fn injected(unit: AdcUnit, channel: u8, rank: u8) -> Self {
        Self {
            unit,
            channel,
            rank,
            injected: true,
        }
    }

    fn max_rank(self) -> u8 {
        if self.injected { 4 } else { 16 }
    }
}

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    /// Two table rows configure the same pin.
    PinConflict { port: Port, pin: u8 },
    /// Pin number outside 0..16.
    PinOutOfRange { port: Port, pin: u8 },
    /// Two channels placed at the same rank of one sequence.
    RankConflict { unit: AdcUnit, rank: u8 },
    /// Rank outside the sequence length of the unit.
    RankOutOfRange { unit: AdcUnit, rank: u8 },
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::PinConflict { port, pin } => write!(f, "pin P{:?}{} configured twice", port, pin),
            Self::PinOutOfRange { port, pin } => write!(f, "pin P{:?}{} out of range", port, pin),
            Self::RankConflict { unit, rank } => write!(f, "{:?} rank {} assigned twice", unit, rank),
            Self::RankOutOfRange { unit, rank } => write!(f, "{:?} rank {} out of range", unit, rank),
        }
    }
}

impl core::error::Error for HwInitError {}

// ── Bring-up entry points ─────────────────────────────────────

/// Configure every pin in [`pins::PIN_TABLE`].
pub fn configure_pins() -> Result<(), HwInitError> {
    check_pin_table(pins::PIN_TABLE)?;
    info!(
        "hw_init(sim): {} pins configured, gate enable on P{:?}{}",
        pins::PIN_TABLE.len(),
        pins::ENABLE_GATE.0,
        pins::ENABLE_GATE.1
    );
    Ok(())
}

/// Map ADC channels to their regular and injected ranks.
pub fn configure_sampling_channels() -> Result<(), HwInitError> {
    check_rank_table(pins::ADC_REGULAR)?;
    check_rank_table(pins::ADC_INJECTED)?;
    info!(
        "hw_init(sim): ADC sequences configured ({} regular, {} injected, {} cycles)",
        pins::ADC_REGULAR.len(),
        pins::ADC_INJECTED.len(),
        pins::ADC_SAMPLE_CYCLES
    );
    Ok(())
}

// ── Table checks ──────────────────────────────────────────────

fn check_pin_table(table: &[PinConfig]) -> Result<(), HwInitError> {
    for (i, cfg) in table.iter().enumerate() {
        if cfg.pin > 15 {
            return Err(HwInitError::PinOutOfRange {
                port: cfg.port,
                pin: cfg.pin,
            });
        }
        if table[..i]
            .iter()
            .any(|prev| prev.port == cfg.port && prev.pin == cfg.pin)
        {
            return Err(HwInitError::PinConflict {
                port: cfg.port,
                pin: cfg.pin,
            });
        }
    }
    Ok(())
}

fn check_rank_table(table: &[AdcRank]) -> Result<(), HwInitError> {
    for (i, r) in table.iter().enumerate() {
        if r.rank == 0 || r.rank > r.max_rank() {
            return Err(HwInitError::RankOutOfRange {
                unit: r.unit,
                rank: r.rank,
            });
        }
        if table[..i]
            .iter()
            .any(|prev| prev.unit == r.unit && prev.injected == r.injected && prev.rank == r.rank)
        {
            return Err(HwInitError::RankConflict {
                unit: r.unit,
                rank: r.rank,
            });
        }
    }
    Ok(())
}
