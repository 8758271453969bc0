//! Step-bounded brightness fade controller

use lumen_hal::Backlight;

use crate::config::clamp_brightness;

/// Brightness change per fade step (%)
pub const FADE_STEP_PERCENT: u8 = 4;

/// Interval between fade steps (ms)
pub const FADE_STEP_INTERVAL_MS: u64 = 50;

/// Current fade geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FadeState {
    /// Brightness currently applied to the backlight (0-100%)
    pub current: u8,
    /// Brightness the fade is heading to (0-100%)
    pub target: u8,
    /// A fade is in progress
    pub active: bool,
}

/// Outcome of a single [`FadeController::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FadeStep {
    /// Moved one step, target not reached yet
    Moving(u8),
    /// Moved onto the target; the fade is finished
    Arrived(u8),
    /// Nothing to do
    Done,
}

impl FadeStep {
    /// Check if the stepper can stop
    pub fn is_finished(&self) -> bool {
        !matches!(self, FadeStep::Moving(_))
    }
}

/// Brightness fade controller
///
/// Owns the backlight output. Every brightness change, animated or not,
/// goes through here so `current` always mirrors what the panel shows.
pub struct FadeController<B: Backlight> {
    output: B,
    state: FadeState,
    enable_fade: bool,
}

impl<B: Backlight> FadeController<B> {
    /// Create a controller and apply the initial brightness immediately
    ///
    /// # Arguments
    /// * `output` - Backlight to drive
    /// * `initial_pct` - Starting brightness, clamped to 100
    /// * `enable_fade` - Animate changes requested with `animate = true`
    pub fn new(mut output: B, initial_pct: u8, enable_fade: bool) -> Self {
        let initial = clamp_brightness(initial_pct);
        output.set_percent(initial);
        Self {
            output,
            state: FadeState {
                current: initial,
                target: initial,
                active: false,
            },
            enable_fade,
        }
    }

    /// Request a new brightness
    ///
    /// Applied immediately when `animate` is false or fading is disabled.
    /// Otherwise a fade starts from the current level; any fade already in
    /// progress is retargeted.
    pub fn set_brightness(&mut self, target_pct: u8, animate: bool) {
        let target = clamp_brightness(target_pct);

        if !animate || !self.enable_fade {
            self.state = FadeState {
                current: target,
                target,
                active: false,
            };
            self.output.set_percent(target);
            return;
        }

        if target == self.state.target && (self.state.active || target == self.state.current) {
            return;
        }

        self.state.target = target;
        self.state.active = target != self.state.current;
    }

    /// Advance the fade by one step
    ///
    /// Never moves past the target.
    pub fn step(&mut self) -> FadeStep {
        let FadeState {
            current, target, ..
        } = self.state;

        if !self.state.active || current == target {
            self.state.active = false;
            return FadeStep::Done;
        }

        let next = if current < target {
            current.saturating_add(FADE_STEP_PERCENT).min(target)
        } else {
            current.saturating_sub(FADE_STEP_PERCENT).max(target)
        };

        self.state.current = next;
        self.output.set_percent(next);

        if next == target {
            self.state.active = false;
            FadeStep::Arrived(next)
        } else {
            FadeStep::Moving(next)
        }
    }

    /// Abandon the fade, leaving brightness where it is
    pub fn stop_fade(&mut self) {
        self.state.target = self.state.current;
        self.state.active = false;
    }

    /// Brightness currently applied
    pub fn brightness(&self) -> u8 {
        self.state.current
    }

    /// Brightness the controller is heading to
    pub fn target(&self) -> u8 {
        self.state.target
    }

    /// Check if a fade is in progress
    pub fn is_fading(&self) -> bool {
        self.state.active
    }

    /// Check if animated requests actually fade
    pub fn fade_enabled(&self) -> bool {
        self.enable_fade
    }

    /// Steps left until the target is reached
    pub fn remaining_steps(&self) -> u8 {
        if !self.state.active {
            return 0;
        }
        let distance = self.state.current.abs_diff(self.state.target);
        distance.div_ceil(FADE_STEP_PERCENT)
    }

    /// Snapshot of the fade geometry
    pub fn state(&self) -> FadeState {
        self.state
    }

    /// Borrow the backlight output
    pub fn output(&self) -> &B {
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    /// Backlight that records every level written to it
    #[derive(Default)]
    struct RecordingBacklight {
        writes: Vec<u8>,
    }

    impl Backlight for RecordingBacklight {
        fn set_percent(&mut self, percent: u8) {
            self.writes.push(percent);
        }
    }

    fn run_to_completion(fade: &mut FadeController<RecordingBacklight>) -> usize {
        let mut steps = 0;
        while !fade.step().is_finished() {
            steps += 1;
            assert!(steps < 100, "fade did not terminate");
        }
        steps + 1
    }

    #[test]
    fn test_initial_brightness_applied() {
        let fade = FadeController::new(RecordingBacklight::default(), 80, true);
        assert_eq!(fade.brightness(), 80);
        assert!(!fade.is_fading());
        assert_eq!(fade.output().writes, [80]);
    }

    #[test]
    fn test_initial_brightness_clamped() {
        let fade = FadeController::new(RecordingBacklight::default(), 200, true);
        assert_eq!(fade.brightness(), 100);
    }

    #[test]
    fn test_fade_up_takes_twenty_steps() {
        let mut fade = FadeController::new(RecordingBacklight::default(), 0, true);
        fade.set_brightness(80, true);
        assert!(fade.is_fading());
        assert_eq!(fade.remaining_steps(), 20);

        let steps = run_to_completion(&mut fade);
        assert_eq!(steps, 20);
        assert_eq!(fade.brightness(), 80);
        assert!(!fade.is_fading());

        let writes = &fade.output().writes;
        assert!(writes.iter().all(|&b| b <= 80));
        assert_eq!(writes.last(), Some(&80));
        assert_eq!(fade.step(), FadeStep::Done);
    }

    #[test]
    fn test_fade_down_clamps_to_target() {
        let mut fade = FadeController::new(RecordingBacklight::default(), 83, true);
        fade.set_brightness(10, true);
        run_to_completion(&mut fade);

        assert_eq!(fade.brightness(), 10);
        let writes = &fade.output().writes;
        assert!(writes.iter().skip(1).all(|&b| b >= 10));
        // 83 -> 11 in 4% steps, then the final step clamps to 10
        assert_eq!(&writes[writes.len() - 2..], &[11, 10]);
    }

    #[test]
    fn test_retarget_mid_fade() {
        let mut fade = FadeController::new(RecordingBacklight::default(), 0, true);
        fade.set_brightness(80, true);
        for _ in 0..10 {
            fade.step();
        }
        assert_eq!(fade.brightness(), 40);

        fade.set_brightness(20, true);
        assert_eq!(fade.step(), FadeStep::Moving(36));
        run_to_completion(&mut fade);
        assert_eq!(fade.brightness(), 20);

        let after_retarget = &fade.output().writes[11..];
        assert!(after_retarget.iter().all(|&b| (20..=40).contains(&b)));
    }

    #[test]
    fn test_immediate_when_not_animated() {
        let mut fade = FadeController::new(RecordingBacklight::default(), 80, true);
        fade.set_brightness(0, false);
        assert_eq!(fade.brightness(), 0);
        assert!(!fade.is_fading());
        assert_eq!(fade.output().writes, [80, 0]);
    }

    #[test]
    fn test_immediate_when_fade_disabled() {
        let mut fade = FadeController::new(RecordingBacklight::default(), 80, false);
        fade.set_brightness(2, true);
        assert_eq!(fade.brightness(), 2);
        assert!(!fade.is_fading());
        assert_eq!(fade.step(), FadeStep::Done);
    }

    #[test]
    fn test_same_target_is_noop() {
        let mut fade = FadeController::new(RecordingBacklight::default(), 50, true);
        fade.set_brightness(50, true);
        assert!(!fade.is_fading());
        assert_eq!(fade.output().writes, [50]);
    }

    #[test]
    fn test_retarget_to_current_level_stops() {
        let mut fade = FadeController::new(RecordingBacklight::default(), 0, true);
        fade.set_brightness(80, true);
        fade.step();
        fade.set_brightness(4, true);
        assert!(!fade.is_fading());
        assert_eq!(fade.step(), FadeStep::Done);
    }

    #[test]
    fn test_stop_fade_holds_level() {
        let mut fade = FadeController::new(RecordingBacklight::default(), 0, true);
        fade.set_brightness(80, true);
        fade.step();
        fade.step();
        fade.stop_fade();
        assert_eq!(fade.brightness(), 8);
        assert_eq!(fade.target(), 8);
        assert_eq!(fade.remaining_steps(), 0);
    }
}
