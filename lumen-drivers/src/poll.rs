//! Bounded polling
//!
//! Device handshakes that wait on a status bit spin for a fixed number of
//! attempts with a short delay between reads, rather than waiting forever.

use embedded_hal::delay::DelayNs;

/// How long to keep polling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollBudget {
    /// Number of reads before giving up
    pub attempts: u32,
    /// Delay after each unsuccessful read (ms)
    pub interval_ms: u32,
}

impl PollBudget {
    /// Create a budget
    pub const fn new(attempts: u32, interval_ms: u32) -> Self {
        Self {
            attempts,
            interval_ms,
        }
    }

    /// Upper bound on the time spent polling (ms)
    pub const fn max_wait_ms(&self) -> u32 {
        self.attempts.saturating_mul(self.interval_ms)
    }
}

/// Why polling stopped without success
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollError<E> {
    /// The condition never held within the budget
    Timeout,
    /// Reading the condition failed
    Failed(E),
}

/// Poll `condition` until it returns true or the budget runs out
///
/// A failing read stops polling immediately.
///
/// # Arguments
/// * `delay` - Delay provider used between reads
/// * `budget` - Attempts and interval
/// * `condition` - Returns `Ok(true)` once the awaited state is reached
///
/// # Returns
/// The number of reads performed on success
pub fn poll_until<D, E, F>(
    delay: &mut D,
    budget: PollBudget,
    mut condition: F,
) -> Result<u32, PollError<E>>
where
    D: DelayNs,
    F: FnMut() -> Result<bool, E>,
{
    for attempt in 1..=budget.attempts {
        if condition().map_err(PollError::Failed)? {
            return Ok(attempt);
        }
        delay.delay_ms(budget.interval_ms);
    }
    Err(PollError::Timeout)
}
