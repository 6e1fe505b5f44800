//! Status LED patterns.
//!
//! Two single-colour channels, no PWM. Patterns are data: a step table for
//! the boot self-test and a two-phase alternation for the fault flash.
//!
//! | Pattern          | Network | Activity | Rate          |
//! |------------------|---------|----------|---------------|
//! | Boot alternate   | ◐       | ◑        | 200 ms, ×2    |
//! | Boot triple      | ●       | ●        | 200 ms, ×3    |
//! | Connecting       | —       | toggle   | 500 ms        |
//! | Connected        | ●       | —        | solid         |
//! | Diagnostic flash | ◐       | ◑        | 500 ms        |

use embedded_hal::delay::DelayNs;
use log::debug;

use crate::app::ports::{Indicator, IndicatorPort, ServoPort};
use crate::control::actuator::ActuatorController;

/// Hold time of each boot blink phase.
pub const BOOT_BLINK_MS: u32 = 200;
/// Sweep rate of the boot servo exercise.
pub const BOOT_SWEEP_DPS: i32 = 180;
/// Hold time of each diagnostic flash phase.
pub const FLASH_HOLD_MS: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootStep {
    Leds {
        network: bool,
        activity: bool,
        hold_ms: u32,
    },
    Sweep {
        angle: i32,
        degrees_per_second: i32,
    },
}

const fn leds(network: bool, activity: bool) -> BootStep {
    BootStep::Leds {
        network,
        activity,
        hold_ms: BOOT_BLINK_MS,
    }
}

const fn sweep(angle: i32) -> BootStep {
    BootStep::Sweep {
        angle,
        degrees_per_second: BOOT_SWEEP_DPS,
    }
}

/// Power-on self-test: both LEDs and the full arm travel.
pub const BOOT_SEQUENCE: &[BootStep] = &[
    // alternate, twice, dark between colours
    leds(true, false),
    leds(false, false),
    leds(false, true),
    leds(false, false),
    leds(true, false),
    leds(false, false),
    leds(false, true),
    leds(false, false),
    // extra hold
    leds(false, false),
    // triple blink
    leds(true, true),
    leds(false, false),
    leds(true, true),
    leds(false, false),
    leds(true, true),
    leds(false, false),
    // full travel, park at centre
    sweep(0),
    sweep(180),
    sweep(90),
    leds(false, false),
    // triple blink
    leds(true, true),
    leds(false, false),
    leds(true, true),
    leds(false, false),
    leds(true, true),
    leds(false, false),
];

/// Play [`BOOT_SEQUENCE`] to completion.
pub fn run_boot_sequence(
    hw: &mut (impl IndicatorPort + ServoPort),
    actuator: &mut ActuatorController,
    delay: &mut impl DelayNs,
) {
    for step in BOOT_SEQUENCE {
        match *step {
            BootStep::Leds {
                network,
                activity,
                hold_ms,
            } => {
                hw.set_indicator(Indicator::Network, network);
                hw.set_indicator(Indicator::Activity, activity);
                delay.delay_ms(hold_ms);
            }
            BootStep::Sweep {
                angle,
                degrees_per_second,
            } => {
                let report = actuator.move_to(hw, delay, angle, degrees_per_second);
                debug!("boot: sweep {} -> {}", report.from, report.to);
            }
        }
    }
}

/// Alternating fault pattern shown after connectivity fails for good.
#[derive(Debug, Default)]
pub struct DiagnosticFlash {
    activity_phase: bool,
}

impl DiagnosticFlash {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the next phase and return how long to hold it.
    pub fn step(&mut self, hw: &mut impl IndicatorPort) -> u32 {
        self.activity_phase = !self.activity_phase;
        hw.set_indicator(Indicator::Activity, self.activity_phase);
        hw.set_indicator(Indicator::Network, !self.activity_phase);
        FLASH_HOLD_MS
    }
}
