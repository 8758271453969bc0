//! Device traits
//!
//! Interfaces between the power logic and sensor drivers. Implementations
//! live in `lumen-drivers`.

pub mod motion;

pub use motion::WakeOnMotion;
