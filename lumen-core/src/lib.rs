//! Board-agnostic core logic for the power and wake engine
//!
//! This crate contains all power-management logic that does not depend on
//! a specific chip or on an async runtime:
//!
//! - Configuration types and validation
//! - Error taxonomy shared by every Lumen crate
//! - Brightness fade controller (step-bounded, no overshoot)
//! - Idle-driven display power state machine with a transition queue
//! - Light-sleep wake source coordination
//! - Device traits implemented by the drivers crate
//!
//! Time is always injected as monotonic milliseconds so every component can
//! be driven deterministically from host tests.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod error;
pub mod fade;
pub mod power;
pub mod sleep;
pub mod traits;

pub use error::Error;
