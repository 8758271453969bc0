//! Display power state machine
//!
//! Owns the fade controller (and through it the backlight), the subscriber
//! registry, and the queue of transitions not yet delivered. It performs
//! no locking and reads no clock; the caller passes `now_ms` and decides
//! where subscribers get notified.

use lumen_hal::Backlight;

use super::state::{PowerSnapshot, PowerState, PowerTransition, WakeSource};
use super::subscribers::{StateCallback, Subscribers, TransitionQueue};
use crate::config::{clamp_brightness, PowerConfig};
use crate::error::Error;
use crate::fade::{FadeController, FadeStep};

/// Idle-driven display power state machine
pub struct PowerStateMachine<B: Backlight> {
    config: PowerConfig,
    state: PowerState,
    previous_state: PowerState,
    last_activity_ms: u64,
    fade: FadeController<B>,
    subscribers: Subscribers,
    pending: TransitionQueue,
}

impl<B: Backlight> PowerStateMachine<B> {
    /// Create a machine in the Active state
    ///
    /// The backlight is set to the user brightness immediately and the idle
    /// clock starts at `now_ms`.
    ///
    /// # Arguments
    /// * `config` - Validated before use
    /// * `backlight` - Output driven by the fade controller
    /// * `now_ms` - Current monotonic time
    pub fn new(config: PowerConfig, backlight: B, now_ms: u64) -> Result<Self, Error> {
        config.validate()?;

        let fade = FadeController::new(backlight, config.user_brightness, config.enable_fade);

        #[cfg(feature = "defmt")]
        defmt::info!(
            "Power manager initialized: dim={}ms, off={}ms, brightness={}%",
            config.dim_timeout_ms,
            config.off_timeout_ms,
            config.user_brightness
        );

        Ok(Self {
            config,
            state: PowerState::Active,
            previous_state: PowerState::Active,
            last_activity_ms: now_ms,
            fade,
            subscribers: Subscribers::new(),
            pending: TransitionQueue::new(),
        })
    }

    /// Register a state change callback
    ///
    /// Returns `ResourceExhausted` when the registry is full.
    pub fn register_state_callback(&mut self, callback: StateCallback) -> Result<(), Error> {
        let result = self.subscribers.register(callback);

        #[cfg(feature = "defmt")]
        match result {
            Ok(()) => defmt::info!("Registered state callback #{}", self.subscribers.len()),
            Err(_) => defmt::error!("Maximum number of callbacks reached"),
        }

        result
    }

    /// Report user or sensor activity
    ///
    /// Restarts the idle clock and returns to Active from any other state.
    pub fn reset_activity(&mut self, _source: WakeSource, now_ms: u64) -> Option<PowerTransition> {
        let _idle_ms = now_ms.saturating_sub(self.last_activity_ms);
        self.last_activity_ms = now_ms;

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "Activity reset by {} (idle was {}ms)",
            _source.as_str(),
            _idle_ms
        );

        if self.state != PowerState::Active {
            self.transition(PowerState::Active)
        } else {
            None
        }
    }

    /// Current state
    pub fn state(&self) -> PowerState {
        self.state
    }

    /// State before the most recent transition
    pub fn previous_state(&self) -> PowerState {
        self.previous_state
    }

    /// Milliseconds since the last reported activity
    pub fn idle_time_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_activity_ms)
    }

    /// Timestamp of the last reported activity
    pub fn last_activity_ms(&self) -> u64 {
        self.last_activity_ms
    }

    /// Brightness restored when returning to Active
    pub fn user_brightness(&self) -> u8 {
        self.config.user_brightness
    }

    /// Brightness currently applied to the backlight
    pub fn brightness(&self) -> u8 {
        self.fade.brightness()
    }

    /// Check if a brightness fade is in progress
    pub fn is_fading(&self) -> bool {
        self.fade.is_fading()
    }

    /// Active configuration
    pub fn config(&self) -> &PowerConfig {
        &self.config
    }

    /// The fade controller driving the backlight
    pub fn fade(&self) -> &FadeController<B> {
        &self.fade
    }

    /// Copy of the observable state
    pub fn snapshot(&self) -> PowerSnapshot {
        PowerSnapshot {
            state: self.state,
            user_brightness: self.config.user_brightness,
            brightness: self.fade.brightness(),
            fading: self.fade.is_fading(),
            last_activity_ms: self.last_activity_ms,
        }
    }

    /// Change the brightness used while Active
    ///
    /// Values above 100 are clamped. Applied right away only when Active;
    /// otherwise it takes effect on the next wake.
    pub fn set_user_brightness(&mut self, percent: u8) {
        let brightness = clamp_brightness(percent);

        #[cfg(feature = "defmt")]
        if brightness != percent {
            defmt::warn!("Brightness clamped to 100% (was {}%)", percent);
        }

        self.config.user_brightness = brightness;

        if self.state == PowerState::Active {
            self.fade.set_brightness(brightness, self.config.enable_fade);
        }

        #[cfg(feature = "defmt")]
        defmt::info!("User brightness set to {}%", brightness);
    }

    /// Force a state for diagnostics
    ///
    /// Takes the same path as an idle-driven transition, so subscribers are
    /// notified and brightness follows.
    pub fn force_state(&mut self, state: PowerState) -> Option<PowerTransition> {
        #[cfg(feature = "defmt")]
        defmt::warn!("Forcing state transition to {}", state.as_str());

        self.transition(state)
    }

    /// State the idle timeouts call for at `now_ms`
    pub fn target_state(&self, now_ms: u64) -> PowerState {
        let idle_ms = self.idle_time_ms(now_ms);

        if idle_ms >= u64::from(self.config.off_timeout_ms) {
            PowerState::Off
        } else if idle_ms >= u64::from(self.config.dim_timeout_ms) {
            PowerState::Dim
        } else {
            PowerState::Active
        }
    }

    /// Periodic evaluation against the idle timeouts
    pub fn evaluate(&mut self, now_ms: u64) -> Option<PowerTransition> {
        let target = self.target_state(now_ms);
        if target != self.state {
            self.transition(target)
        } else {
            None
        }
    }

    /// Move to `new_state`
    ///
    /// No-op when already there. Otherwise retargets the backlight once and
    /// queues the transition for subscribers.
    pub fn transition(&mut self, new_state: PowerState) -> Option<PowerTransition> {
        let old_state = self.state;
        if old_state == new_state {
            return None;
        }

        #[cfg(feature = "defmt")]
        defmt::info!(
            "State transition: {} -> {}",
            old_state.as_str(),
            new_state.as_str()
        );

        self.previous_state = old_state;
        self.state = new_state;

        let directive = new_state.directive(&self.config);
        self.fade.set_brightness(directive.level, directive.animate);

        let transition = PowerTransition {
            from: old_state,
            to: new_state,
        };
        self.pending.push(transition);
        Some(transition)
    }

    /// Take the oldest undelivered transition
    pub fn pop_transition(&mut self) -> Option<PowerTransition> {
        self.pending.pop()
    }

    /// Number of undelivered transitions
    pub fn pending_transitions(&self) -> usize {
        self.pending.len()
    }

    /// Copy of the subscriber registry
    ///
    /// Lets callers notify subscribers after releasing their lock.
    pub fn subscribers(&self) -> Subscribers {
        self.subscribers.clone()
    }

    /// Deliver every pending transition to the subscribers
    ///
    /// For single-context use where no lock is held around the machine.
    /// Returns the number of transitions delivered.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut delivered = 0;
        while let Some(transition) = self.pending.pop() {
            self.subscribers.notify(transition);
            delivered += 1;
        }
        delivered
    }

    /// Advance an in-progress fade by one step
    pub fn step_fade(&mut self) -> FadeStep {
        self.fade.step()
    }
}
