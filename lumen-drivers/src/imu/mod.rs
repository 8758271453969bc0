//! Inertial measurement units
//!
//! Only the wake-on-motion side of the sensor is driven here; motion
//! sampling for the UI happens elsewhere.

pub mod qmi8658;
pub mod registers;
pub mod wom;

pub use qmi8658::{MotionWakeStatus, Qmi8658, RegisterDump, WomState};
pub use wom::{AccelOdr, InterruptLevel, InterruptPin, WomConfig, WomInterrupt, WomStep};
