//! Badge and notification content derived from the timer record

use serde::Serialize;

use super::timer_state::{Completion, Phase, TimerState};

pub const FOCUS_COLOR: &str = "#e74c3c";
pub const BREAK_COLOR: &str = "#2ecc71";
pub const FOCUS_ICON: &str = "images/icon-focus.png";
pub const BREAK_ICON: &str = "images/icon-break.png";

pub fn phase_color(phase: Phase) -> &'static str {
    match phase {
        Phase::Focus => FOCUS_COLOR,
        Phase::Break => BREAK_COLOR,
    }
}

pub fn phase_icon(phase: Phase) -> &'static str {
    match phase {
        Phase::Focus => FOCUS_ICON,
        Phase::Break => BREAK_ICON,
    }
}

/// Toolbar badge: label, background color and icon
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    /// Remaining whole minutes rounded up, empty when stopped.
    pub text: String,
    pub color: &'static str,
    pub icon: &'static str,
}

impl Badge {
    pub fn from_state(state: &TimerState) -> Self {
        let text = if state.is_running {
            state.time_left.div_ceil(60).to_string()
        } else {
            String::new()
        };
        let phase = state.phase();
        Self {
            text,
            color: phase_color(phase),
            icon: phase_icon(phase),
        }
    }
}

/// Message shown when an interval ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub icon: &'static str,
    /// Suppress the notification sound.
    pub silent: bool,
}

impl Notification {
    pub fn for_completion(completion: Completion, task_name: &str, sound_enabled: bool) -> Self {
        let message = match completion.finished {
            Phase::Focus => format!("{} is complete. Time for a break!", task_name),
            Phase::Break => format!("Break is over. Time to focus on {}!", task_name),
        };
        Self {
            title: completion.started.label().to_string(),
            message,
            icon: phase_icon(completion.started),
            silent: !sound_enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn badge_rounds_minutes_up_while_running() {
        let mut state = TimerState::new(Utc::now());
        state.is_running = true;
        state.time_left = 61;
        assert_eq!(Badge::from_state(&state).text, "2");

        state.time_left = 60;
        assert_eq!(Badge::from_state(&state).text, "1");
    }

    #[test]
    fn badge_is_empty_when_stopped() {
        let state = TimerState::new(Utc::now());
        let badge = Badge::from_state(&state);
        assert!(badge.text.is_empty());
        assert_eq!(badge.color, FOCUS_COLOR);
        assert_eq!(badge.icon, FOCUS_ICON);
    }

    #[test]
    fn break_uses_green_badge() {
        let mut state = TimerState::new(Utc::now());
        state.is_focus = false;
        let badge = Badge::from_state(&state);
        assert_eq!(badge.color, BREAK_COLOR);
        assert_eq!(badge.icon, BREAK_ICON);
    }

    #[test]
    fn notification_names_the_task_and_next_interval() {
        let done = Completion {
            finished: Phase::Focus,
            started: Phase::Break,
        };
        let note = Notification::for_completion(done, "Essay", false);
        assert_eq!(note.title, "Break Time");
        assert_eq!(note.message, "Essay is complete. Time for a break!");
        assert_eq!(note.icon, BREAK_ICON);
        assert!(note.silent);
    }
}
