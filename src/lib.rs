//! GaugeArm firmware library.
//!
//! Polls an HTTP endpoint, pulls one number out of the JSON reply and shows
//! it on a servo-driven needle. Exposes the pure-logic modules for
//! integration testing. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod extract;
pub mod net;

pub mod adapters;
pub mod drivers;
pub mod pins;
