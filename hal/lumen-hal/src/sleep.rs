//! Light-sleep wake channel abstractions
//!
//! Provides the arming primitives a SoC exposes before entering a
//! low-power mode from which execution resumes. Arming is additive: a
//! channel armed once stays armed until the next reset of the sleep
//! controller.

/// Signal level that wakes the chip from a GPIO channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WakeLevel {
    /// Wake while the line is held low
    Low,
    /// Wake while the line is held high
    High,
}

/// Why the chip left light sleep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WakeCause {
    /// Sleep timer expired
    Timer,
    /// Activity on an armed serial line
    Line,
    /// Armed GPIO reached its wake level
    Edge,
    /// Anything else (undefined, normal boot, other peripherals)
    Other,
}

impl WakeCause {
    /// Human-readable name for diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            WakeCause::Timer => "Timer",
            WakeCause::Line => "UART",
            WakeCause::Edge => "GPIO",
            WakeCause::Other => "Other/Unknown",
        }
    }
}

/// Light-sleep controller
///
/// Mirrors the SoC sleep API: arm wake channels, enter sleep, and ask why
/// the chip woke up.
pub trait SleepController {
    /// Error type for arming or sleep entry failures
    type Error;

    /// Arm the sleep timer to wake after `duration_us` microseconds
    fn arm_timer_wakeup(&mut self, duration_us: u64) -> Result<(), Self::Error>;

    /// Arm a GPIO to wake the chip when it reaches `level`
    ///
    /// # Arguments
    /// * `pin` - GPIO number
    /// * `level` - Level that triggers the wake
    fn arm_gpio_wakeup(&mut self, pin: u8, level: WakeLevel) -> Result<(), Self::Error>;

    /// Arm a UART to wake the chip on RX line activity
    ///
    /// # Arguments
    /// * `uart` - UART peripheral number
    fn arm_uart_wakeup(&mut self, uart: u8) -> Result<(), Self::Error>;

    /// Enter light sleep, returning once an armed channel fires
    fn light_sleep(&mut self) -> Result<(), Self::Error>;

    /// Cause of the most recent wake
    fn wakeup_cause(&self) -> WakeCause;
}

impl<T: SleepController + ?Sized> SleepController for &mut T {
    type Error = T::Error;

    fn arm_timer_wakeup(&mut self, duration_us: u64) -> Result<(), Self::Error> {
        (**self).arm_timer_wakeup(duration_us)
    }

    fn arm_gpio_wakeup(&mut self, pin: u8, level: WakeLevel) -> Result<(), Self::Error> {
        (**self).arm_gpio_wakeup(pin, level)
    }

    fn arm_uart_wakeup(&mut self, uart: u8) -> Result<(), Self::Error> {
        (**self).arm_uart_wakeup(uart)
    }

    fn light_sleep(&mut self) -> Result<(), Self::Error> {
        (**self).light_sleep()
    }

    fn wakeup_cause(&self) -> WakeCause {
        (**self).wakeup_cause()
    }
}
