//! State management module
//!
//! This module contains the timer record, its display projections and the
//! controller that owns them.

pub mod app_state;
pub mod display;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use display::{Badge, Notification};
pub use timer_state::{
    format_clock, Completion, Mode, Phase, StartOptions, TickOutcome, TimerState,
    DEFAULT_TASK_NAME, MAX_INTERVAL_MINUTES,
};
