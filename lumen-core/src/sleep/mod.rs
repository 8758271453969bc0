//! Light-sleep wake source coordination
//!
//! Decides which channels may bring the device back from light sleep and
//! arms them, in a fixed order, on a [`lumen_hal::SleepController`].

pub mod coordinator;

pub use coordinator::{
    ArmError, ArmedChannels, SleepCoordinator, WakeChannel, WakeSources,
    DEFAULT_HOUSEKEEPING_INTERVAL_MS, DEFAULT_MOTION_WAKE_PIN, DEFAULT_SCANNER_UART,
};
