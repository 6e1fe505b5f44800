//! Output-side control: arm motion and LED patterns.

pub mod actuator;
pub mod indicator;
