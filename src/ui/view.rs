//! Popup rendering: what each control shows for a given timer record

use std::fmt;

use crate::state::{
    display::{phase_color, FOCUS_COLOR},
    format_clock, Mode, TimerState,
};

const READY_STATUS: &str = "Ready to start";

/// Snapshot of every popup control, derived from one [`TimerState`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupView {
    /// Remaining time as `MM:SS`.
    pub clock: String,
    pub clock_color: &'static str,
    pub status: &'static str,
    pub task_input: String,
    pub task_input_disabled: bool,
    pub classic_mode_active: bool,
    pub extended_mode_active: bool,
    pub sound_on_active: bool,
    pub sound_off_active: bool,
    pub start_disabled: bool,
    pub pause_disabled: bool,
}

impl PopupView {
    pub fn render(state: &TimerState) -> Self {
        let (status, clock_color) = if state.is_running {
            (state.phase().label(), phase_color(state.phase()))
        } else {
            (READY_STATUS, FOCUS_COLOR)
        };

        Self {
            clock: format_clock(state.time_left),
            clock_color,
            status,
            task_input: state.task_name.clone(),
            task_input_disabled: state.is_running,
            classic_mode_active: state.mode == Mode::Classic,
            extended_mode_active: state.mode == Mode::Extended,
            sound_on_active: state.sound_enabled,
            sound_off_active: !state.sound_enabled,
            start_disabled: state.is_running,
            pause_disabled: !state.is_running,
        }
    }
}

impl fmt::Display for PopupView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.classic_mode_active {
            "25-5"
        } else if self.extended_mode_active {
            "50-10"
        } else {
            "custom"
        };
        let sound = if self.sound_on_active { "on" } else { "off" };
        write!(
            f,
            "{}  {:<14} {}  [mode {} | sound {}]",
            self.clock, self.status, self.task_input, mode, sound
        )
    }
}
