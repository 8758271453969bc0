//! Brightness fading
//!
//! Brightness changes are animated in fixed-size steps, driven by an
//! external periodic stepper. The step count is bounded by the distance to
//! the target, never by wall-clock time, so a late or skipped tick can only
//! slow a fade down.

pub mod controller;

pub use controller::{FadeController, FadeState, FadeStep, FADE_STEP_INTERVAL_MS, FADE_STEP_PERCENT};
