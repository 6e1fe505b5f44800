//! GPIO / peripheral pin assignments for the GaugeArm board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Status LEDs (active-low, sink current through the GPIO)
// ---------------------------------------------------------------------------

/// Lit while associated with the network.
pub const NETWORK_LED_GPIO: i32 = 2;
/// Lit while the arm moves; blinks during association.
pub const ACTIVITY_LED_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Servo (hobby servo on an LEDC channel)
// ---------------------------------------------------------------------------

pub const SERVO_GPIO: i32 = 14;
/// Standard 20 ms servo frame.
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
/// Pulse width at 0°.
pub const SERVO_PULSE_MIN_US: u32 = 500;
/// Pulse width at 180°.
pub const SERVO_PULSE_MAX_US: u32 = 2_500;
/// LEDC timer resolution for the servo channel.
pub const SERVO_PWM_RESOLUTION_BITS: u32 = 14;
