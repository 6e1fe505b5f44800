//! Single-colour status LED driver.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives an active-low GPIO via hw_init.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;

pub struct StatusLed {
    pin: i32,
    lit: bool,
}

impl StatusLed {
    /// The LED starts dark, matching what `hw_init` leaves on the pin.
    pub fn new(pin: i32) -> Self {
        Self { pin, lit: false }
    }

    pub fn set(&mut self, on: bool) {
        // Active-low.
        hw_init::gpio_write(self.pin, !on);
        self.lit = on;
    }

    pub fn toggle(&mut self) {
        self.set(!self.lit);
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    pub fn pin(&self) -> i32 {
        self.pin
    }
}
