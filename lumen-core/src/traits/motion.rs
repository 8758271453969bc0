//! Wake-on-motion sensor trait

use crate::error::Error;

/// A sensor that can raise an interrupt when the device is moved
///
/// The runtime only needs to confirm that a pending interrupt was really a
/// motion event, and to back out of wake-on-motion if arming went wrong.
pub trait WakeOnMotion {
    /// Check the sensor's latched motion flag
    ///
    /// Returns false on a bus error.
    fn check_wom_event(&mut self) -> bool;

    /// Disable the sensor and leave wake-on-motion mode
    fn exit_wom_mode(&mut self) -> Result<(), Error>;

    /// Check if motion wake is currently armed
    fn is_armed(&self) -> bool;
}

impl<T: WakeOnMotion + ?Sized> WakeOnMotion for &mut T {
    fn check_wom_event(&mut self) -> bool {
        (**self).check_wom_event()
    }

    fn exit_wom_mode(&mut self) -> Result<(), Error> {
        (**self).exit_wom_mode()
    }

    fn is_armed(&self) -> bool {
        (**self).is_armed()
    }
}
