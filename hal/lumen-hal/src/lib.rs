//! Lumen Hardware Abstraction Layer
//!
//! This crate defines the chip-facing traits the power and wake engine
//! drives. Board firmware implements them for the concrete backlight PWM
//! and the SoC's light-sleep controller, which keeps the engine itself
//! host-testable.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  lumen-runtime (tasks, locking)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  lumen-core (state machine, fade, sleep)│
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  lumen-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  board firmware (PWM, sleep registers)  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`backlight::Backlight`] - Display backlight output
//! - [`sleep::SleepController`] - Light-sleep wake channel arming

#![no_std]
#![deny(unsafe_code)]

pub mod backlight;
pub mod sleep;

// Re-export key traits at crate root for convenience
pub use backlight::Backlight;
pub use sleep::{SleepController, WakeCause, WakeLevel};
