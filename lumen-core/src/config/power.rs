//! Power management configuration
//!
//! Defaults match the shipped handheld: dim after 10 s, display off after
//! 20 s, a nearly-dark dim level, and animated transitions.

use crate::error::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Highest brightness value, in percent
pub const MAX_BRIGHTNESS: u8 = 100;

/// Idle time before dimming (ms)
pub const DEFAULT_DIM_TIMEOUT_MS: u32 = 10 * 1000;

/// Idle time before the display turns off (ms)
pub const DEFAULT_OFF_TIMEOUT_MS: u32 = 20 * 1000;

/// Idle time before light sleep (ms), reserved for the sleep policy
pub const DEFAULT_SLEEP_TIMEOUT_MS: u32 = 30 * 1000;

/// Brightness while dimmed (%)
pub const DEFAULT_DIM_BRIGHTNESS: u8 = 2;

/// Brightness while active (%)
pub const DEFAULT_USER_BRIGHTNESS: u8 = 80;

/// Nominal fade duration (ms)
pub const DEFAULT_FADE_DURATION_MS: u16 = 1000;

/// Clamp a brightness value into 0-100%
pub fn clamp_brightness(percent: u8) -> u8 {
    percent.min(MAX_BRIGHTNESS)
}

/// Power management configuration
///
/// Stored by value inside the state machine. Only `user_brightness` changes
/// after init.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PowerConfig {
    /// Idle time before dimming (ms)
    pub dim_timeout_ms: u32,
    /// Idle time before turning the display off (ms)
    pub off_timeout_ms: u32,
    /// Idle time before light sleep (ms)
    pub sleep_timeout_ms: u32,
    /// Brightness when dimmed (0-100%)
    pub dim_brightness: u8,
    /// Brightness restored on wake (0-100%)
    pub user_brightness: u8,
    /// Animate brightness transitions
    pub enable_fade: bool,
    /// Nominal fade duration (ms)
    ///
    /// Informational: the fade itself is step-bounded, see [`crate::fade`].
    pub fade_duration_ms: u16,
}

impl PowerConfig {
    /// Configuration used by the shipped firmware
    pub const DEFAULT: Self = Self {
        dim_timeout_ms: DEFAULT_DIM_TIMEOUT_MS,
        off_timeout_ms: DEFAULT_OFF_TIMEOUT_MS,
        sleep_timeout_ms: DEFAULT_SLEEP_TIMEOUT_MS,
        dim_brightness: DEFAULT_DIM_BRIGHTNESS,
        user_brightness: DEFAULT_USER_BRIGHTNESS,
        enable_fade: true,
        fade_duration_ms: DEFAULT_FADE_DURATION_MS,
    };

    /// Set the dim and off idle timeouts
    #[must_use]
    pub const fn with_timeouts(mut self, dim_timeout_ms: u32, off_timeout_ms: u32) -> Self {
        self.dim_timeout_ms = dim_timeout_ms;
        self.off_timeout_ms = off_timeout_ms;
        self
    }

    /// Set the user and dim brightness levels
    #[must_use]
    pub const fn with_brightness(mut self, user_brightness: u8, dim_brightness: u8) -> Self {
        self.user_brightness = user_brightness;
        self.dim_brightness = dim_brightness;
        self
    }

    /// Enable or disable animated transitions
    #[must_use]
    pub const fn with_fade(mut self, enable_fade: bool) -> Self {
        self.enable_fade = enable_fade;
        self
    }

    /// Check the configuration before it is stored
    ///
    /// Brightness levels must be 0-100% and the off timeout must not come
    /// before the dim timeout.
    pub fn validate(&self) -> Result<(), Error> {
        if self.dim_brightness > MAX_BRIGHTNESS || self.user_brightness > MAX_BRIGHTNESS {
            return Err(Error::InvalidArgument);
        }
        if self.off_timeout_ms < self.dim_timeout_ms {
            return Err(Error::InvalidArgument);
        }
        Ok(())
    }
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
