//! Application core: pure domain logic, zero I/O.
//!
//! Pipeline orchestration for the gauge: connectivity gating, fetch,
//! extraction and arm motion. All interaction with hardware and the
//! network happens through **port traits** defined in [`ports`].

pub mod events;
pub mod ports;
pub mod service;
