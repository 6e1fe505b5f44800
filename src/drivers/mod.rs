//! Hardware drivers: LED GPIO bring-up, status LEDs and the servo.

pub mod hw_init;
pub mod servo;
pub mod status_led;
