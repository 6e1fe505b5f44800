//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns both status LEDs and the servo driver, exposing them through
//! [`IndicatorPort`] and [`ServoPort`]. On non-espidf targets the LED
//! drivers use cfg-gated simulation stubs and the servo takes any
//! [`SetDutyCycle`] implementation.

use embedded_hal::pwm::SetDutyCycle;

use crate::app::ports::{Indicator, IndicatorPort, ServoPort};
use crate::drivers::servo::ServoDriver;
use crate::drivers::status_led::StatusLed;
use crate::pins;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<P> {
    network_led: StatusLed,
    activity_led: StatusLed,
    servo: ServoDriver<P>,
}

impl<P: SetDutyCycle> HardwareAdapter<P> {
    pub fn new(servo: ServoDriver<P>) -> Self {
        Self {
            network_led: StatusLed::new(pins::NETWORK_LED_GPIO),
            activity_led: StatusLed::new(pins::ACTIVITY_LED_GPIO),
            servo,
        }
    }

    pub fn indicator(&self, which: Indicator) -> bool {
        match which {
            Indicator::Network => self.network_led.is_lit(),
            Indicator::Activity => self.activity_led.is_lit(),
        }
    }

    pub fn servo_angle(&self) -> Option<u8> {
        self.servo.last_angle()
    }

    /// Both LEDs dark.
    pub fn all_off(&mut self) {
        self.network_led.set(false);
        self.activity_led.set(false);
    }
}

// ── IndicatorPort implementation ──────────────────────────────

impl<P: SetDutyCycle> IndicatorPort for HardwareAdapter<P> {
    fn set_indicator(&mut self, which: Indicator, on: bool) {
        match which {
            Indicator::Network => self.network_led.set(on),
            Indicator::Activity => self.activity_led.set(on),
        }
    }
}

// ── ServoPort implementation ──────────────────────────────────

impl<P: SetDutyCycle> ServoPort for HardwareAdapter<P> {
    fn write_angle(&mut self, degrees: u8) {
        self.servo.write_angle(degrees);
    }
}
