//! Display backlight abstraction
//!
//! The engine works in whole percent. Mapping percent to a PWM duty cycle
//! (and any gamma curve) is the implementation's job.

/// Display backlight output
///
/// Implementations should apply the level immediately; animation is
/// handled above this layer.
pub trait Backlight {
    /// Set the backlight level in percent (0-100)
    ///
    /// Callers never pass values above 100.
    fn set_percent(&mut self, percent: u8);
}

impl<T: Backlight + ?Sized> Backlight for &mut T {
    fn set_percent(&mut self, percent: u8) {
        (**self).set_percent(percent);
    }
}
