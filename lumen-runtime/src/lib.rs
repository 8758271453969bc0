//! Lumen Runtime
//!
//! Embassy glue for the power engine: a shared [`PowerManager`] guarded by
//! an async mutex, and the long-running loops that drive it.
//!
//! Board firmware owns the executor. A typical setup:
//!
//! ```ignore
//! static POWER: StaticCell<PowerManager<CriticalSectionRawMutex, Pwm>> = StaticCell::new();
//!
//! let power = POWER.init(PowerManager::new(PowerConfig::default(), backlight)?);
//! spawner.must_spawn(evaluator_task(power));
//! spawner.must_spawn(fade_task(power));
//! spawner.must_spawn(wake_task(power));
//! ```

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod manager;
pub mod tasks;

pub use manager::{uptime_ms, Clock, PowerManager, LOCK_TIMEOUT_MS, WAKE_QUEUE_DEPTH};
pub use tasks::{EVALUATOR_INTERVAL_MS, MOTION_RETRY_MS, STATUS_LOG_TICKS};
