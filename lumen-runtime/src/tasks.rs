//! Long-running power loops
//!
//! Each loop borrows the shared [`PowerManager`] and never returns. Board
//! firmware wraps them in `#[embassy_executor::task]` functions:
//!
//! - `run_evaluator`: checks idle timeouts once a second
//! - `run_fade_stepper`: steps brightness fades every 50 ms while one is active
//! - `run_wake_dispatch`: turns interrupt hand-offs into activity resets
//! - `run_motion_wake`: waits on the WoM interrupt line

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{Duration, Ticker, Timer};
use embedded_hal_async::digital::Wait;
use lumen_core::fade::FADE_STEP_INTERVAL_MS;
use lumen_core::power::WakeSource;
use lumen_core::traits::WakeOnMotion;
use lumen_hal::Backlight;

use crate::manager::PowerManager;

/// Idle timeout evaluation period (ms)
pub const EVALUATOR_INTERVAL_MS: u64 = 1000;

/// Log the power state every this many evaluator ticks
pub const STATUS_LOG_TICKS: u32 = 10;

/// Back-off after the interrupt line reports an error (ms)
pub const MOTION_RETRY_MS: u64 = 100;

/// Back-off before retrying a wake that hit a lock timeout (ms)
pub const WAKE_RETRY_MS: u64 = 10;

impl<M: RawMutex, B: Backlight, const Q: usize> PowerManager<M, B, Q> {
    /// Evaluate idle timeouts periodically
    ///
    /// A lock timeout skips the tick; the next tick retries.
    pub async fn run_evaluator(&self) {
        #[cfg(feature = "defmt")]
        defmt::info!("Power evaluator started");

        let mut ticker = Ticker::every(Duration::from_millis(EVALUATOR_INTERVAL_MS));
        let mut ticks: u32 = 0;

        loop {
            ticker.next().await;

            if let Err(_err) = self.evaluate().await {
                #[cfg(feature = "defmt")]
                defmt::warn!("Power evaluation skipped: {}", _err);
            }

            ticks = ticks.wrapping_add(1);
            if ticks % STATUS_LOG_TICKS == 0 {
                self.log_status();
            }
        }
    }

    /// Step brightness fades
    ///
    /// Sleeps until a fade starts, then steps every
    /// [`FADE_STEP_INTERVAL_MS`] until it completes.
    pub async fn run_fade_stepper(&self) {
        loop {
            self.fade_signal.wait().await;

            let mut ticker = Ticker::every(Duration::from_millis(FADE_STEP_INTERVAL_MS));
            loop {
                ticker.next().await;
                match self.step_fade().await {
                    Ok(step) if step.is_finished() => break,
                    Ok(_) => {}
                    Err(_err) => {
                        #[cfg(feature = "defmt")]
                        defmt::warn!("Fade step skipped: {}", _err);
                    }
                }
            }
        }
    }

    /// Apply wake events handed off with [`signal_wake`](Self::signal_wake)
    pub async fn run_wake_dispatch(&self) {
        loop {
            let source = self.wakes.receive().await;
            self.apply_wake(source).await;
        }
    }

    /// Wake the display when the motion sensor fires
    ///
    /// Each rising edge on `interrupt` is confirmed against the sensor's
    /// WoM flag before activity is reset.
    pub async fn run_motion_wake<P, S>(&self, interrupt: &mut P, sensor: &mut S)
    where
        P: Wait,
        S: WakeOnMotion,
    {
        loop {
            if interrupt.wait_for_rising_edge().await.is_err() {
                #[cfg(feature = "defmt")]
                defmt::warn!("Motion interrupt line error");
                Timer::after(Duration::from_millis(MOTION_RETRY_MS)).await;
                continue;
            }

            if !sensor.check_wom_event() {
                continue;
            }

            self.apply_wake(WakeSource::Wom).await;
        }
    }

    /// Reset activity for `source`, retrying while the lock is busy
    ///
    /// A wake is only given up on a non-retryable error.
    async fn apply_wake(&self, source: WakeSource) {
        loop {
            match self.reset_activity(source).await {
                Ok(()) => return,
                Err(err) if err.is_retryable() => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("Wake from {} delayed: {}", source.as_str(), err);
                    Timer::after(Duration::from_millis(WAKE_RETRY_MS)).await;
                }
                Err(_err) => {
                    #[cfg(feature = "defmt")]
                    defmt::error!("Wake from {} dropped: {}", source.as_str(), _err);
                    return;
                }
            }
        }
    }

    fn log_status(&self) {
        #[cfg(feature = "defmt")]
        {
            let snapshot = self.snapshot();
            defmt::info!(
                "State: {}, Idle: {}ms, Brightness: {}%",
                snapshot.state.as_str(),
                snapshot.idle_time_ms(self.now_ms()),
                snapshot.brightness
            );
        }
    }
}
