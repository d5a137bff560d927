//! GPIO / ADC assignments for the CED motor-controller board.
//!
//! Single source of truth for the bring-up tables.  The runtime itself
//! never reads these; they are consumed once by
//! [`hw_init`](crate::drivers::hw_init) at boot.

use crate::drivers::hw_init::{AdcRank, AdcUnit, PinConfig, PinMode, Port};

// ---------------------------------------------------------------------------
// Gate driver (DRV8301)
// ---------------------------------------------------------------------------

/// Gate-driver enable output.
pub const ENABLE_GATE: (Port, u8) = (Port::B, 5);
/// Gate-driver SPI chip select.
pub const DRV8301_CS: (Port, u8) = (Port::C, 9);
/// Gate-driver fault input (active low).
pub const DRV_FAULT: (Port, u8) = (Port::B, 7);

// ---------------------------------------------------------------------------
// Pin mode table
// ---------------------------------------------------------------------------

pub const PIN_TABLE: &[PinConfig] = &[
    PinConfig::new(Port::B, 5, PinMode::OutputPushPull, "enable_gate"),
    PinConfig::new(Port::C, 9, PinMode::OutputPushPull, "drv_cs"),
    // TIM1 high/low side outputs
    PinConfig::new(Port::A, 8, PinMode::AlternateTim1, "pwm_ah"),
    PinConfig::new(Port::A, 9, PinMode::AlternateTim1, "pwm_bh"),
    PinConfig::new(Port::A, 10, PinMode::AlternateTim1, "pwm_ch"),
    PinConfig::new(Port::B, 13, PinMode::AlternateTim1, "pwm_al"),
    PinConfig::new(Port::B, 14, PinMode::AlternateTim1, "pwm_bl"),
    PinConfig::new(Port::B, 15, PinMode::AlternateTim1, "pwm_cl"),
    // Hall sensors
    PinConfig::new(Port::C, 6, PinMode::InputPullUp, "hall_1"),
    PinConfig::new(Port::C, 7, PinMode::InputPullUp, "hall_2"),
    PinConfig::new(Port::C, 8, PinMode::InputPullUp, "hall_3"),
    PinConfig::new(Port::B, 7, PinMode::InputPullUp, "drv_fault"),
    // Analog inputs
    PinConfig::new(Port::A, 0, PinMode::InputAnalog, "adc_a0"),
    PinConfig::new(Port::A, 1, PinMode::InputAnalog, "adc_a1"),
    PinConfig::new(Port::A, 2, PinMode::InputAnalog, "adc_a2"),
    PinConfig::new(Port::A, 3, PinMode::InputAnalog, "adc_a3"),
    PinConfig::new(Port::C, 0, PinMode::InputAnalog, "adc_c0"),
    PinConfig::new(Port::C, 1, PinMode::InputAnalog, "adc_c1"),
    PinConfig::new(Port::C, 2, PinMode::InputAnalog, "adc_c2"),
    PinConfig::new(Port::C, 3, PinMode::InputAnalog, "adc_c3"),
    PinConfig::new(Port::C, 4, PinMode::InputAnalog, "adc_c4"),
];

// ---------------------------------------------------------------------------
// ADC sequencing
// ---------------------------------------------------------------------------

/// Sample time for every channel, in ADC clock cycles.
pub const ADC_SAMPLE_CYCLES: u8 = 15;

/// Internal reference voltage channel.
pub const ADC_CHANNEL_VREFINT: u8 = 17;

/// Regular conversion sequence.  Rank 3 on ADC1/ADC2 is left unused.
pub const ADC_REGULAR: &[AdcRank] = &[
    AdcRank::regular(AdcUnit::Adc1, 10, 1),
    AdcRank::regular(AdcUnit::Adc1, 0, 2),
    AdcRank::regular(AdcUnit::Adc1, 14, 4),
    AdcRank::regular(AdcUnit::Adc1, ADC_CHANNEL_VREFINT, 5),
    AdcRank::regular(AdcUnit::Adc2, 11, 1),
    AdcRank::regular(AdcUnit::Adc2, 1, 2),
    AdcRank::regular(AdcUnit::Adc2, 15, 4),
    AdcRank::regular(AdcUnit::Adc2, 0, 5),
    AdcRank::regular(AdcUnit::Adc3, 12, 1),
    AdcRank::regular(AdcUnit::Adc3, 2, 2),
    AdcRank::regular(AdcUnit::Adc3, 3, 3),
    AdcRank::regular(AdcUnit::Adc3, 13, 4),
    AdcRank::regular(AdcUnit::Adc3, 1, 5),
];

/// Injected (current-sense) sequence: phase current sampled three times.
pub const ADC_INJECTED: &[AdcRank] = &[
    AdcRank::injected(AdcUnit::Adc1, 10, 1),
    AdcRank::injected(AdcUnit::Adc2, 11, 1),
    AdcRank::injected(AdcUnit::Adc3, 12, 1),
    AdcRank::injected(AdcUnit::Adc1, 10, 2),
    AdcRank::injected(AdcUnit::Adc2, 11, 2),
    AdcRank::injected(AdcUnit::Adc3, 12, 2),
    AdcRank::injected(AdcUnit::Adc1, 10, 3),
    AdcRank::injected(AdcUnit::Adc2, 11, 3),
    AdcRank::injected(AdcUnit::Adc3, 12, 3),
];
