//! Error taxonomy
//!
//! One small `Copy` enum shared by the state machine, the sleep
//! coordinator, and the sensor driver so the runtime can surface every
//! failure the same way.

use core::fmt;

/// Errors reported by power and wake operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Caller input out of range or otherwise unusable
    InvalidArgument,
    /// A bounded resource (callback registry, queue) is full
    ResourceExhausted,
    /// Lock acquisition, command handshake, or sleep entry did not finish in time
    ///
    /// Always retryable.
    Timeout,
    /// Bus transaction or peripheral access failed
    HardwareIo,
}

impl Error {
    /// Check if the operation may succeed when simply retried later
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Timeout)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::InvalidArgument => "invalid argument",
            Error::ResourceExhausted => "resource exhausted",
            Error::Timeout => "timed out",
            Error::HardwareIo => "hardware I/O failure",
        };
        f.write_str(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::ToString;

    #[test]
    fn test_only_timeout_is_retryable() {
        assert!(Error::Timeout.is_retryable());
        assert!(!Error::InvalidArgument.is_retryable());
        assert!(!Error::ResourceExhausted.is_retryable());
        assert!(!Error::HardwareIo.is_retryable());
    }

    #[test]
    fn test_display() {
        assert_eq!(Error::HardwareIo.to_string(), "hardware I/O failure");
    }
}
