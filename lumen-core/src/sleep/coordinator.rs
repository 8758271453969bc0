//! Wake channel arming and manual light sleep

use lumen_hal::{SleepController, WakeCause, WakeLevel};

use crate::error::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Housekeeping timer wake interval (ms)
pub const DEFAULT_HOUSEKEEPING_INTERVAL_MS: u32 = 100;

/// GPIO wired to the motion sensor's INT2 line
pub const DEFAULT_MOTION_WAKE_PIN: u8 = 9;

/// UART the barcode scanner is attached to (UART0 is the console)
pub const DEFAULT_SCANNER_UART: u8 = 1;

/// A wake channel the coordinator arms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WakeChannel {
    /// Periodic housekeeping timer
    Timer,
    /// Motion sensor interrupt level
    MotionEdge,
    /// Serial line activity from the scanner
    SerialLine,
}

impl WakeChannel {
    /// Name for diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            WakeChannel::Timer => "timer",
            WakeChannel::MotionEdge => "motion interrupt",
            WakeChannel::SerialLine => "serial line",
        }
    }
}

/// Wake channel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WakeSources {
    /// Housekeeping timer interval (ms)
    pub timer_interval_ms: u32,
    /// GPIO connected to the motion interrupt
    pub motion_pin: u8,
    /// Level of the motion interrupt that wakes the chip
    pub motion_level: WakeLevel,
    /// UART monitored for scanner activity
    pub serial_port: u8,
}

impl Default for WakeSources {
    fn default() -> Self {
        Self {
            timer_interval_ms: DEFAULT_HOUSEKEEPING_INTERVAL_MS,
            motion_pin: DEFAULT_MOTION_WAKE_PIN,
            motion_level: WakeLevel::High,
            serial_port: DEFAULT_SCANNER_UART,
        }
    }
}

/// Channels currently armed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ArmedChannels {
    /// Timer wake armed
    pub timer: bool,
    /// Motion interrupt wake armed
    pub motion: bool,
    /// Serial line wake armed
    pub serial: bool,
}

impl ArmedChannels {
    /// Check if every channel is armed
    pub fn all(&self) -> bool {
        self.timer && self.motion && self.serial
    }
}

/// Arming a wake channel failed
///
/// Channels armed before the failing one stay armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ArmError {
    /// Channel that could not be armed
    pub channel: WakeChannel,
}

impl From<ArmError> for Error {
    fn from(_: ArmError) -> Self {
        Error::HardwareIo
    }
}

/// Arms wake channels and runs manual light sleep
pub struct SleepCoordinator<S: SleepController> {
    controller: S,
    sources: WakeSources,
    armed: ArmedChannels,
}

impl<S: SleepController> SleepCoordinator<S> {
    /// Create a coordinator; nothing is armed until asked
    pub fn new(controller: S, sources: WakeSources) -> Self {
        Self {
            controller,
            sources,
            armed: ArmedChannels::default(),
        }
    }

    /// Arm every configured wake channel
    ///
    /// Order: housekeeping timer, motion interrupt level, serial line. Stops
    /// at the first failure and reports that channel.
    pub fn configure_light_sleep(&mut self) -> Result<ArmedChannels, ArmError> {
        #[cfg(feature = "defmt")]
        defmt::info!("Configuring sleep wake sources");

        let interval_us = u64::from(self.sources.timer_interval_ms) * 1000;
        self.arm(WakeChannel::Timer, |c, _| c.arm_timer_wakeup(interval_us))?;
        self.armed.timer = true;

        self.arm(WakeChannel::MotionEdge, |c, s| {
            c.arm_gpio_wakeup(s.motion_pin, s.motion_level)
        })?;
        self.armed.motion = true;

        self.arm(WakeChannel::SerialLine, |c, s| c.arm_uart_wakeup(s.serial_port))?;
        self.armed.serial = true;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "Light sleep configured: timer {}ms, GPIO{}, UART{}",
            self.sources.timer_interval_ms,
            self.sources.motion_pin,
            self.sources.serial_port
        );

        Ok(self.armed)
    }

    /// Sleep for up to `duration_ms`, or until the scanner sends data
    ///
    /// Arms the timer for the requested duration plus the serial line, then
    /// enters light sleep. A rejected sleep entry is reported as `Timeout`
    /// so the caller may retry.
    pub fn enter_manual_sleep(&mut self, duration_ms: u32) -> Result<WakeCause, Error> {
        #[cfg(feature = "defmt")]
        defmt::info!("Entering manual light sleep for {}ms", duration_ms);

        let duration_us = u64::from(duration_ms) * 1000;
        self.arm(WakeChannel::Timer, |c, _| c.arm_timer_wakeup(duration_us))?;
        self.armed.timer = true;

        self.arm(WakeChannel::SerialLine, |c, s| c.arm_uart_wakeup(s.serial_port))?;
        self.armed.serial = true;

        let entered = self.controller.light_sleep();
        let cause = self.controller.wakeup_cause();

        #[cfg(feature = "defmt")]
        defmt::info!(
            "Woke from light sleep, cause: {}, entered: {}",
            cause.as_str(),
            entered.is_ok()
        );

        entered.map(|_| cause).map_err(|_| Error::Timeout)
    }

    /// Why the chip last woke up
    pub fn wake_cause(&self) -> WakeCause {
        self.controller.wakeup_cause()
    }

    /// Channels armed so far
    pub fn armed(&self) -> ArmedChannels {
        self.armed
    }

    /// Wake channel configuration
    pub fn sources(&self) -> &WakeSources {
        &self.sources
    }

    /// Borrow the underlying controller
    pub fn controller(&self) -> &S {
        &self.controller
    }

    fn arm<F>(&mut self, channel: WakeChannel, arm: F) -> Result<(), ArmError>
    where
        F: FnOnce(&mut S, &WakeSources) -> Result<(), S::Error>,
    {
        arm(&mut self.controller, &self.sources).map_err(|_| {
            #[cfg(feature = "defmt")]
            defmt::error!("Failed to arm {} wake source", channel.as_str());
            ArmError { channel }
        })
    }
}
