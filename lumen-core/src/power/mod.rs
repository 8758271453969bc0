//! Display power management
//!
//! An idle-driven state machine that dims and blanks the display:
//!
//! ```text
//!             idle >= dim_timeout        idle >= off_timeout
//!   Active ───────────────────────► Dim ───────────────────► Off
//!     ▲                              │                        │
//!     └────────── reset_activity ────┴────────────────────────┘
//!
//!   Sleep is only entered through force_state and left through
//!   reset_activity.
//! ```
//!
//! Every transition retargets the backlight exactly once and is queued for
//! subscribers, which are notified outside of whatever lock guards the
//! machine.

pub mod machine;
pub mod state;
pub mod subscribers;

pub use machine::PowerStateMachine;
pub use state::{BrightnessDirective, PowerSnapshot, PowerState, PowerTransition, WakeSource};
pub use subscribers::{
    StateCallback, Subscribers, TransitionQueue, MAX_STATE_CALLBACKS, TRANSITION_QUEUE_DEPTH,
};
