//! Power states, wake sources and published transition data

use crate::config::PowerConfig;

/// Display power state, ordered by decreasing display power
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    /// Display at user brightness
    Active,
    /// Display dimmed after the first idle timeout
    Dim,
    /// Backlight off after the second idle timeout
    Off,
    /// Backlight cut immediately ahead of light sleep
    Sleep,
}

impl PowerState {
    /// Name for diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerState::Active => "Active",
            PowerState::Dim => "Dim",
            PowerState::Off => "Off",
            PowerState::Sleep => "Sleep",
        }
    }

    /// Check if the backlight is lit in this state
    pub fn display_on(&self) -> bool {
        matches!(self, PowerState::Active | PowerState::Dim)
    }

    /// Brightness to apply on entering this state
    pub fn directive(&self, config: &PowerConfig) -> BrightnessDirective {
        match self {
            PowerState::Active => BrightnessDirective {
                level: config.user_brightness,
                animate: config.enable_fade,
            },
            PowerState::Dim => BrightnessDirective {
                level: config.dim_brightness,
                animate: config.enable_fade,
            },
            PowerState::Off => BrightnessDirective {
                level: 0,
                animate: config.enable_fade,
            },
            // Cut immediately, the fade stepper will not run while asleep
            PowerState::Sleep => BrightnessDirective {
                level: 0,
                animate: false,
            },
        }
    }
}

/// What caused activity to be reported
///
/// Only used for logging and diagnostics; every source resets the idle
/// clock the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WakeSource {
    /// Touch screen interaction
    Touch,
    /// Physical button press
    Button,
    /// Motion detected by polling the sensor
    Motion,
    /// Wake-on-motion interrupt
    Wom,
    /// Periodic timer or manual sleep expiry
    Timer,
    /// Software request
    Api,
}

impl WakeSource {
    /// Name for diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            WakeSource::Touch => "Touch",
            WakeSource::Button => "Button",
            WakeSource::Motion => "Motion",
            WakeSource::Wom => "WoM",
            WakeSource::Timer => "Timer",
            WakeSource::Api => "API",
        }
    }
}

/// Brightness request derived from a target state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BrightnessDirective {
    /// Target brightness (0-100%)
    pub level: u8,
    /// Fade to the level rather than jumping
    pub animate: bool,
}

/// A completed state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PowerTransition {
    /// State before the change
    pub from: PowerState,
    /// State after the change
    pub to: PowerState,
}

/// Read-only copy of the machine's observable state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PowerSnapshot {
    /// Current power state
    pub state: PowerState,
    /// Brightness restored on wake (0-100%)
    pub user_brightness: u8,
    /// Brightness currently applied (0-100%)
    pub brightness: u8,
    /// A fade is in progress
    pub fading: bool,
    /// Timestamp of the last reported activity (ms)
    pub last_activity_ms: u64,
}

impl PowerSnapshot {
    /// Idle time at `now_ms`, saturating at zero for stale clocks
    pub fn idle_time_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_activity_ms)
    }
}
