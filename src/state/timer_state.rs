//! Timer record and the pure transitions applied to it

use std::{fmt, str::FromStr};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PomodoroError;

/// Placeholder shown when the task name is blank.
pub const DEFAULT_TASK_NAME: &str = "Pomodoro Session";

/// Longest focus or break interval accepted, in minutes.
pub const MAX_INTERVAL_MINUTES: u32 = 24 * 60;

/// Interval preset selected by the popup's mode buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mode {
    /// 25 minutes of focus, 5 minutes of break.
    #[default]
    #[serde(rename = "25-5")]
    Classic,
    /// 50 minutes of focus, 10 minutes of break.
    #[serde(rename = "50-10")]
    Extended,
    /// Durations chosen explicitly through `startTimer`.
    #[serde(rename = "custom")]
    Custom,
}

/// Focus and break durations in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub focus_minutes: u32,
    pub break_minutes: u32,
}

const PRESETS: [(Mode, Preset); 2] = [
    (Mode::Classic, Preset { focus_minutes: 25, break_minutes: 5 }),
    (Mode::Extended, Preset { focus_minutes: 50, break_minutes: 10 }),
];

impl Mode {
    /// Preset durations for this mode, `None` for [`Mode::Custom`].
    pub fn preset(self) -> Option<Preset> {
        PRESETS
            .iter()
            .find(|(mode, _)| *mode == self)
            .map(|(_, preset)| *preset)
    }

    /// The preset with exactly these durations, otherwise [`Mode::Custom`]
    pub fn for_durations(focus_minutes: u32, break_minutes: u32) -> Self {
        PRESETS
            .iter()
            .find(|(_, preset)| {
                preset.focus_minutes == focus_minutes && preset.break_minutes == break_minutes
            })
            .map_or(Mode::Custom, |(mode, _)| *mode)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Classic => "25-5",
            Mode::Extended => "50-10",
            Mode::Custom => "custom",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = PomodoroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "25-5" => Ok(Mode::Classic),
            "50-10" => Ok(Mode::Extended),
            "custom" => Ok(Mode::Custom),
            other => Err(PomodoroError::InvalidMode(other.to_string())),
        }
    }
}

/// Which interval the timer is counting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Focus,
    Break,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Focus => "Focus Time",
            Phase::Break => "Break Time",
        }
    }

    pub fn other(self) -> Self {
        match self {
            Phase::Focus => Phase::Break,
            Phase::Break => Phase::Focus,
        }
    }
}

/// Optional overrides carried by a `startTimer` message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StartOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_enabled: Option<bool>,
    /// Explicit focus minutes; switches the mode to `custom`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_time: Option<u32>,
    /// Explicit break minutes; switches the mode to `custom`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub break_time: Option<u32>,
}

/// Interval transition produced when the countdown reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub finished: Phase,
    pub started: Phase,
}

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The timer is not running.
    Idle,
    /// Less than a whole second passed since the last update.
    Waiting,
    /// Time was consumed and the interval continues.
    Counted { remaining: u32 },
    /// The interval ended and the next one began.
    Completed(Completion),
}

/// The single timer record owned by the state controller and persisted as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredTimerState")]
pub struct TimerState {
    pub time_left: u32,
    pub is_running: bool,
    pub is_focus: bool,
    pub task_name: String,
    pub sound_enabled: bool,
    pub focus_time: u32,
    pub break_time: u32,
    pub mode: Mode,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_update_time: DateTime<Utc>,
}

/// Wire shape of [`TimerState`] as read back, with every field optional.
///
/// Records written before `mode` existed carry only their durations, so the
/// mode is inferred from them instead of defaulting to the classic preset.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredTimerState {
    time_left: u32,
    is_running: bool,
    is_focus: bool,
    task_name: String,
    sound_enabled: bool,
    focus_time: u32,
    break_time: u32,
    mode: Option<Mode>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    last_update_time: DateTime<Utc>,
}

impl Default for StoredTimerState {
    fn default() -> Self {
        let defaults = TimerState::default();
        Self {
            time_left: defaults.time_left,
            is_running: defaults.is_running,
            is_focus: defaults.is_focus,
            task_name: defaults.task_name,
            sound_enabled: defaults.sound_enabled,
            focus_time: defaults.focus_time,
            break_time: defaults.break_time,
            mode: None,
            last_update_time: defaults.last_update_time,
        }
    }
}

impl From<StoredTimerState> for TimerState {
    fn from(stored: StoredTimerState) -> Self {
        Self {
            time_left: stored.time_left,
            is_running: stored.is_running,
            is_focus: stored.is_focus,
            task_name: stored.task_name,
            sound_enabled: stored.sound_enabled,
            focus_time: stored.focus_time,
            break_time: stored.break_time,
            mode: stored
                .mode
                .unwrap_or_else(|| Mode::for_durations(stored.focus_time, stored.break_time)),
            last_update_time: stored.last_update_time,
        }
    }
}

impl TimerState {
    /// Create a stopped focus interval with the default preset
    pub fn new(now: DateTime<Utc>) -> Self {
        let preset = Mode::default().preset().unwrap_or(Preset {
            focus_minutes: 25,
            break_minutes: 5,
        });
        Self {
            time_left: preset.focus_minutes * 60,
            is_running: false,
            is_focus: true,
            task_name: DEFAULT_TASK_NAME.to_string(),
            sound_enabled: true,
            focus_time: preset.focus_minutes,
            break_time: preset.break_minutes,
            mode: Mode::default(),
            last_update_time: now,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.is_focus {
            Phase::Focus
        } else {
            Phase::Break
        }
    }

    /// Full length of the current interval in seconds
    pub fn interval_seconds(&self) -> u32 {
        let minutes = if self.is_focus {
            self.focus_time
        } else {
            self.break_time
        };
        minutes.saturating_mul(60)
    }

    /// Re-establish the record invariants.
    ///
    /// A preset mode overwrites both durations, durations are clamped to
    /// `1..=MAX_INTERVAL_MINUTES` and a blank task name falls back to
    /// [`DEFAULT_TASK_NAME`].
    pub fn validate(&mut self) {
        if let Some(preset) = self.mode.preset() {
            self.focus_time = preset.focus_minutes;
            self.break_time = preset.break_minutes;
        }
        self.focus_time = self.focus_time.clamp(1, MAX_INTERVAL_MINUTES);
        self.break_time = self.break_time.clamp(1, MAX_INTERVAL_MINUTES);
        self.task_name = normalize_task_name(&self.task_name);
    }

    /// Apply `startTimer` overrides and re-validate
    pub fn apply_start_options(&mut self, options: &StartOptions) {
        if let Some(mode) = options.mode {
            self.mode = mode;
        }
        if options.focus_time.is_some() || options.break_time.is_some() {
            self.mode = Mode::Custom;
        }
        if let Some(focus) = options.focus_time {
            self.focus_time = focus;
        }
        if let Some(brk) = options.break_time {
            self.break_time = brk;
        }
        if let Some(name) = &options.task_name {
            self.task_name = name.clone();
        }
        if let Some(sound) = options.sound_enabled {
            self.sound_enabled = sound;
        }
        self.validate();
    }

    /// Begin (or keep) counting down from the current `time_left`.
    ///
    /// A running interval whose time ran out before this call is completed
    /// first, and the returned [`Completion`] must be announced like any
    /// other.
    pub fn start(&mut self, options: &StartOptions, now: DateTime<Utc>) -> Option<Completion> {
        self.apply_drift(now);
        let completion = (self.is_running && self.time_left == 0).then(|| self.complete(now));
        self.apply_start_options(options);
        if self.time_left == 0 {
            self.time_left = self.interval_seconds();
        }
        self.is_running = true;
        self.last_update_time = now;
        completion
    }

    pub fn pause(&mut self, now: DateTime<Utc>) {
        self.apply_drift(now);
        self.is_running = false;
        self.last_update_time = now;
    }

    /// Stop and rewind to a full focus interval
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.is_focus = true;
        self.time_left = self.interval_seconds();
        self.is_running = false;
        self.last_update_time = now;
    }

    pub fn set_task_name(&mut self, name: &str) {
        self.task_name = normalize_task_name(name);
    }

    /// Switch preset, rewinding to a stopped focus interval
    pub fn set_mode(&mut self, mode: Mode, now: DateTime<Utc>) {
        self.mode = mode;
        self.validate();
        self.reset(now);
    }

    /// Whole seconds elapsed since `last_update_time`, advancing it by the
    /// same amount so fractional remainders carry over to the next call.
    fn take_elapsed(&mut self, now: DateTime<Utc>) -> u32 {
        let elapsed = (now - self.last_update_time).num_seconds();
        if elapsed < 0 {
            self.last_update_time = now;
            return 0;
        }
        if elapsed > 0 {
            self.last_update_time += Duration::seconds(elapsed);
        }
        u32::try_from(elapsed).unwrap_or(u32::MAX)
    }

    /// Subtract real time elapsed while running, floored at zero.
    ///
    /// Returns the number of seconds removed from `time_left`. A stopped
    /// timer is left untouched.
    pub fn apply_drift(&mut self, now: DateTime<Utc>) -> u32 {
        if !self.is_running {
            return 0;
        }
        let consumed = self.take_elapsed(now).min(self.time_left);
        self.time_left -= consumed;
        consumed
    }

    /// One cycle of the countdown.
    ///
    /// Consumes whole elapsed seconds, so a second trigger inside the same
    /// second is a no-op rather than a double decrement.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        if !self.is_running {
            return TickOutcome::Idle;
        }
        if self.time_left > 0 {
            if self.apply_drift(now) == 0 {
                return TickOutcome::Waiting;
            }
            if self.time_left > 0 {
                return TickOutcome::Counted {
                    remaining: self.time_left,
                };
            }
        }
        TickOutcome::Completed(self.complete(now))
    }

    /// Flip to the other interval and keep running
    pub fn complete(&mut self, now: DateTime<Utc>) -> Completion {
        let finished = self.phase();
        self.is_focus = !self.is_focus;
        self.time_left = self.interval_seconds();
        self.is_running = true;
        self.last_update_time = now;
        Completion {
            finished,
            started: finished.other(),
        }
    }

    /// When the current interval is due to end, if running
    pub fn completion_deadline(&self) -> Option<DateTime<Utc>> {
        self.is_running
            .then(|| self.last_update_time + Duration::seconds(i64::from(self.time_left)))
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

fn normalize_task_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        DEFAULT_TASK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Format seconds as zero-padded `MM:SS`
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn reset_rewinds_to_focus_for_any_durations() {
        for (focus, brk) in [(1, 1), (25, 5), (50, 10), (90, 30)] {
            let mut state = TimerState::new(at(0));
            state.mode = Mode::Custom;
            state.focus_time = focus;
            state.break_time = brk;
            state.is_focus = false;
            state.is_running = true;
            state.time_left = 17;

            state.reset(at(5));

            assert!(state.is_focus);
            assert!(!state.is_running);
            assert_eq!(state.time_left, focus * 60);
        }
    }

    #[test]
    fn tick_never_goes_below_zero() {
        let mut state = TimerState::new(at(0));
        state.is_running = true;
        state.time_left = 3;

        // A long suspension consumes more than what is left.
        let outcome = state.tick(at(100));

        assert!(matches!(outcome, TickOutcome::Completed(_)));
        assert_eq!(state.time_left, state.break_time * 60);
    }

    #[test]
    fn tick_within_the_same_second_is_a_no_op() {
        let mut state = TimerState::new(at(0));
        state.start(&StartOptions::default(), at(0));

        assert_eq!(state.tick(at(1)), TickOutcome::Counted { remaining: 1499 });
        assert_eq!(state.tick(at(1)), TickOutcome::Waiting);
        assert_eq!(state.time_left, 1499);
    }

    #[test]
    fn completion_flips_phase_once_and_keeps_running() {
        let mut state = TimerState::new(at(0));
        state.start(&StartOptions::default(), at(0));
        state.time_left = 1;

        let outcome = state.tick(at(1));

        assert_eq!(
            outcome,
            TickOutcome::Completed(Completion {
                finished: Phase::Focus,
                started: Phase::Break,
            })
        );
        assert!(!state.is_focus);
        assert!(state.is_running);
        assert_eq!(state.time_left, 300);
    }

    #[test]
    fn stopped_timer_ignores_ticks_and_drift() {
        let mut state = TimerState::new(at(0));
        assert_eq!(state.tick(at(60)), TickOutcome::Idle);
        assert_eq!(state.apply_drift(at(600)), 0);
        assert_eq!(state.time_left, 1500);
    }

    #[test]
    fn preset_modes_force_durations() {
        let mut state = TimerState::new(at(0));
        state.focus_time = 7;
        state.break_time = 3;

        state.set_mode(Mode::Extended, at(1));
        assert_eq!((state.focus_time, state.break_time), (50, 10));
        assert_eq!(state.time_left, 3000);

        state.set_mode(Mode::Classic, at(2));
        assert_eq!((state.focus_time, state.break_time), (25, 5));
        assert_eq!(state.time_left, 1500);
    }

    #[test]
    fn blank_task_name_resolves_to_placeholder() {
        let mut state = TimerState::new(at(0));
        state.set_task_name("   \t ");
        assert_eq!(state.task_name, DEFAULT_TASK_NAME);

        state.set_task_name("  write report ");
        assert_eq!(state.task_name, "write report");
    }

    #[test]
    fn explicit_durations_switch_to_custom_mode() {
        let mut state = TimerState::new(at(0));
        state.time_left = 0;
        let options = StartOptions {
            focus_time: Some(40),
            break_time: Some(0),
            ..StartOptions::default()
        };

        state.start(&options, at(0));

        assert_eq!(state.mode, Mode::Custom);
        assert_eq!(state.focus_time, 40);
        assert_eq!(state.break_time, 1);
        assert_eq!(state.time_left, 2400);
    }

    #[test]
    fn pause_keeps_remaining_time_for_resume() {
        let mut state = TimerState::new(at(0));
        state.start(&StartOptions::default(), at(0));
        state.time_left = 900;
        state.last_update_time = at(10);

        state.pause(at(10));
        state.start(&StartOptions::default(), at(4_000));

        assert_eq!(state.time_left, 900);
        assert!(state.is_running);
    }

    #[test]
    fn mode_parses_wire_tags() {
        assert_eq!("25-5".parse::<Mode>().unwrap(), Mode::Classic);
        assert_eq!("50-10".parse::<Mode>().unwrap(), Mode::Extended);
        assert!("15-3".parse::<Mode>().is_err());
    }

    #[test]
    fn record_from_older_version_fills_defaults() {
        let json = r#"{"timeLeft":120,"isRunning":false,"isFocus":false,
            "taskName":"","soundEnabled":false}"#;

        let mut state: TimerState = serde_json::from_str(json).unwrap();
        state.validate();

        assert_eq!(state.mode, Mode::Classic);
        assert_eq!((state.focus_time, state.break_time), (25, 5));
        assert_eq!(state.time_left, 120);
        assert_eq!(state.task_name, DEFAULT_TASK_NAME);
    }

    #[test]
    fn record_without_mode_keeps_its_durations() {
        let json = r#"{"timeLeft":120,"isRunning":false,"isFocus":false,
            "taskName":"Essay","soundEnabled":true,"focusTime":25,"breakTime":10}"#;

        let mut state: TimerState = serde_json::from_str(json).unwrap();
        state.validate();

        assert_eq!(state.mode, Mode::Custom);
        assert_eq!((state.focus_time, state.break_time), (25, 10));

        let json = r#"{"focusTime":50,"breakTime":10}"#;
        let state: TimerState = serde_json::from_str(json).unwrap();
        assert_eq!(state.mode, Mode::Extended);
    }

    #[test]
    fn stored_mode_wins_over_durations() {
        let json = r#"{"mode":"25-5","focusTime":25,"breakTime":10}"#;

        let mut state: TimerState = serde_json::from_str(json).unwrap();
        state.validate();

        assert_eq!(state.mode, Mode::Classic);
        assert_eq!(state.break_time, 5);
    }

    #[test]
    fn start_completes_an_interval_that_ran_out_unseen() {
        let mut state = TimerState::new(at(0));
        state.is_running = true;
        state.time_left = 5;

        let completion = state.start(
            &StartOptions {
                sound_enabled: Some(false),
                ..StartOptions::default()
            },
            at(10),
        );

        assert_eq!(
            completion,
            Some(Completion {
                finished: Phase::Focus,
                started: Phase::Break,
            })
        );
        assert!(!state.is_focus);
        assert!(state.is_running);
        assert!(!state.sound_enabled);
        assert_eq!(state.time_left, 300);
        assert_eq!(state.last_update_time, at(10));
    }

    #[test]
    fn start_from_stopped_never_completes() {
        let mut state = TimerState::new(at(0));
        state.time_left = 0;

        assert_eq!(state.start(&StartOptions::default(), at(10)), None);
        assert!(state.is_focus);
        assert_eq!(state.time_left, 1500);
    }

    #[test]
    fn huge_durations_are_clamped() {
        let mut state = TimerState::new(at(0));
        state.start(
            &StartOptions {
                focus_time: Some(100_000_000),
                break_time: Some(u32::MAX),
                ..StartOptions::default()
            },
            at(0),
        );
        assert_eq!(state.focus_time, MAX_INTERVAL_MINUTES);
        assert_eq!(state.break_time, MAX_INTERVAL_MINUTES);

        state.reset(at(1));
        assert_eq!(state.time_left, MAX_INTERVAL_MINUTES * 60);

        // A hand-edited record that skipped validation still cannot overflow.
        state.focus_time = u32::MAX;
        state.reset(at(2));
        assert_eq!(state.time_left, u32::MAX);
    }

    #[test]
    fn clock_is_zero_padded() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(3000), "50:00");
    }
}
