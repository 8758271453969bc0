//! Shared power manager
//!
//! Wraps the core state machine in an async mutex so UI, sensor and timer
//! tasks can all report activity. Every locked operation waits at most
//! [`LOCK_TIMEOUT_MS`] for the lock and reports `Timeout` otherwise.
//!
//! After each locked operation the manager:
//! 1. publishes a fresh [`PowerSnapshot`] for lock-free readers
//! 2. releases the lock
//! 3. wakes the fade stepper if a new fade started
//! 4. notifies subscribers of queued transitions
//!
//! Subscribers therefore never run while the lock is held.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::{Mutex, MutexGuard};
use embassy_sync::signal::Signal;
use embassy_time::{with_timeout, Duration, Instant};
use heapless::Vec;
use lumen_core::config::PowerConfig;
use lumen_core::fade::FadeStep;
use lumen_core::power::{
    PowerSnapshot, PowerState, PowerStateMachine, PowerTransition, StateCallback, WakeSource,
    TRANSITION_QUEUE_DEPTH,
};
use lumen_core::sleep::SleepCoordinator;
use lumen_core::Error;
use lumen_hal::{Backlight, SleepController, WakeCause};

/// Longest wait for the state lock (ms)
pub const LOCK_TIMEOUT_MS: u64 = 100;

/// Default capacity of the wake hand-off queue
pub const WAKE_QUEUE_DEPTH: usize = 4;

/// Monotonic millisecond clock
pub type Clock = fn() -> u64;

/// Milliseconds since boot from the embassy time driver
pub fn uptime_ms() -> u64 {
    Instant::now().as_millis()
}

/// Power manager shared between tasks
///
/// Place it in a `StaticCell` (or any `'static` location) and hand `&self`
/// to every task that needs it.
pub struct PowerManager<M: RawMutex, B: Backlight, const Q: usize = WAKE_QUEUE_DEPTH> {
    machine: Mutex<M, PowerStateMachine<B>>,
    snapshot: BlockingMutex<M, Cell<PowerSnapshot>>,
    pub(crate) fade_signal: Signal<M, ()>,
    pub(crate) wakes: Channel<M, WakeSource, Q>,
    clock: Clock,
    lock_timeout: Duration,
}

impl<M: RawMutex, B: Backlight, const Q: usize> PowerManager<M, B, Q> {
    /// Create a manager using the embassy clock
    pub fn new(config: PowerConfig, backlight: B) -> Result<Self, Error> {
        Self::with_clock(config, backlight, uptime_ms)
    }

    /// Create a manager reading time from `clock`
    pub fn with_clock(config: PowerConfig, backlight: B, clock: Clock) -> Result<Self, Error> {
        let machine = PowerStateMachine::new(config, backlight, clock())?;
        let snapshot = machine.snapshot();

        Ok(Self {
            machine: Mutex::new(machine),
            snapshot: BlockingMutex::new(Cell::new(snapshot)),
            fade_signal: Signal::new(),
            wakes: Channel::new(),
            clock,
            lock_timeout: Duration::from_millis(LOCK_TIMEOUT_MS),
        })
    }

    /// Override the lock wait
    #[must_use]
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Current time from the manager's clock (ms)
    pub fn now_ms(&self) -> u64 {
        (self.clock)()
    }

    /// Register a state change callback
    pub async fn register_state_callback(&self, callback: StateCallback) -> Result<(), Error> {
        self.with_machine(|machine, _| machine.register_state_callback(callback))
            .await?
    }

    /// Report activity, waking the display if needed
    pub async fn reset_activity(&self, source: WakeSource) -> Result<(), Error> {
        self.with_machine(|machine, now_ms| {
            machine.reset_activity(source, now_ms);
        })
        .await
    }

    /// Change the brightness used while Active
    pub async fn set_user_brightness(&self, percent: u8) -> Result<(), Error> {
        self.with_machine(|machine, _| machine.set_user_brightness(percent))
            .await
    }

    /// Force a state for diagnostics
    pub async fn force_state(&self, state: PowerState) -> Result<Option<PowerTransition>, Error> {
        self.with_machine(|machine, _| machine.force_state(state))
            .await
    }

    /// Evaluate the idle timeouts now
    pub async fn evaluate(&self) -> Result<Option<PowerTransition>, Error> {
        self.with_machine(|machine, now_ms| machine.evaluate(now_ms))
            .await
    }

    /// Advance an in-progress fade by one step
    pub async fn step_fade(&self) -> Result<FadeStep, Error> {
        self.with_machine(|machine, _| machine.step_fade()).await
    }

    /// Latest published snapshot, without taking the lock
    pub fn snapshot(&self) -> PowerSnapshot {
        self.snapshot.lock(|cell| cell.get())
    }

    /// Current state, without taking the lock
    pub fn state(&self) -> PowerState {
        self.snapshot().state
    }

    /// User brightness, without taking the lock
    pub fn user_brightness(&self) -> u8 {
        self.snapshot().user_brightness
    }

    /// Milliseconds since the last reported activity
    pub fn idle_time_ms(&self) -> u64 {
        self.snapshot().idle_time_ms(self.now_ms())
    }

    /// Hand a wake event to the dispatch task
    ///
    /// Never blocks, so it may be called from interrupt context when `M`
    /// is interrupt-safe. Returns false if the queue is full.
    pub fn signal_wake(&self, source: WakeSource) -> bool {
        self.wakes.try_send(source).is_ok()
    }

    /// Enter manual light sleep, then restart the idle clock
    ///
    /// Activity is reset even if sleep entry failed, so the display comes
    /// back either way.
    pub async fn sleep_for<S: SleepController>(
        &self,
        coordinator: &mut SleepCoordinator<S>,
        duration_ms: u32,
    ) -> Result<WakeCause, Error> {
        let slept = coordinator.enter_manual_sleep(duration_ms);

        #[cfg(feature = "defmt")]
        if let Err(err) = slept {
            defmt::warn!("Manual sleep failed: {}", err);
        }

        self.reset_activity(WakeSource::Timer).await?;
        slept
    }

    /// Acquire the state lock, giving up after the lock timeout
    pub(crate) async fn lock(&self) -> Result<MutexGuard<'_, M, PowerStateMachine<B>>, Error> {
        with_timeout(self.lock_timeout, self.machine.lock())
            .await
            .map_err(|_| {
                #[cfg(feature = "defmt")]
                defmt::warn!("Timed out waiting for power state lock");
                Error::Timeout
            })
    }

    /// Run `f` under the lock, then publish and notify outside it
    async fn with_machine<R>(
        &self,
        f: impl FnOnce(&mut PowerStateMachine<B>, u64) -> R,
    ) -> Result<R, Error> {
        let mut machine = self.lock().await?;
        let was_fading = machine.is_fading();
        let result = f(&mut *machine, self.now_ms());

        let snapshot = machine.snapshot();
        self.snapshot.lock(|cell| cell.set(snapshot));

        let mut delivered: Vec<PowerTransition, TRANSITION_QUEUE_DEPTH> = Vec::new();
        while let Some(transition) = machine.pop_transition() {
            // Queue depth bounds the drain
            let _ = delivered.push(transition);
        }
        let subscribers = machine.subscribers();
        drop(machine);

        // A running stepper keeps going on its own; only wake it for a new fade
        if snapshot.fading && !was_fading {
            self.fade_signal.signal(());
        }

        for transition in delivered {
            subscribers.notify(transition);
        }

        Ok(result)
    }
}
