//! Configuration types
//!
//! Board-agnostic configuration structures supplied once at init.

pub mod power;

pub use power::*;
