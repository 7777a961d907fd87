//! State controller: owns the timer record and every side effect of mutating it

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Instant,
};

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::{
    display::{Badge, Notification},
    timer_state::{Completion, Mode, StartOptions, TickOutcome, TimerState},
};
use crate::{
    api::messages::{Broadcast, Request},
    services::{Indicator, StateStore},
};

/// Main application state: the single timer record plus its collaborators
pub struct AppState {
    timer: Mutex<TimerState>,
    store: Arc<dyn StateStore>,
    indicator: Arc<dyn Indicator>,
    /// Server metadata
    pub start_time: Instant,
    /// Channel for `timerUpdated` pushes
    pub broadcast_tx: broadcast::Sender<Broadcast>,
    /// Whether the one-second tick loop should be running
    pub ticker_tx: watch::Sender<bool>,
    /// Deadline of the completion alarm, `None` when cleared
    pub alarm_tx: watch::Sender<Option<DateTime<Utc>>>,
    /// Keep the receivers alive to prevent channel closure
    _ticker_rx: watch::Receiver<bool>,
    _alarm_rx: watch::Receiver<Option<DateTime<Utc>>>,
}

impl AppState {
    fn with_state(
        timer: TimerState,
        store: Arc<dyn StateStore>,
        indicator: Arc<dyn Indicator>,
    ) -> Self {
        let (broadcast_tx, _) = broadcast::channel(100);
        let (ticker_tx, ticker_rx) = watch::channel(false);
        let (alarm_tx, alarm_rx) = watch::channel(None);

        Self {
            timer: Mutex::new(timer),
            store,
            indicator,
            start_time: Instant::now(),
            broadcast_tx,
            ticker_tx,
            alarm_tx,
            _ticker_rx: ticker_rx,
            _alarm_rx: alarm_rx,
        }
    }

    /// Restore the persisted record, falling back to a full reset.
    ///
    /// A record that was running when the process stopped resumes with the
    /// suspended time subtracted.
    pub fn restore(store: Arc<dyn StateStore>, indicator: Arc<dyn Indicator>) -> Self {
        let loaded = store.load();
        let state = Self::with_state(TimerState::default(), store, indicator);

        match loaded {
            Ok(Some(mut restored)) => {
                restored.validate();
                let now = Utc::now();
                let drift = restored.apply_drift(now);
                info!(
                    "Restored timer state: {}s left, running={}, focus={} (drift {}s)",
                    restored.time_left, restored.is_running, restored.is_focus, drift
                );
                let running = restored.is_running;
                *state.lock() = restored;
                if running {
                    // Drift may have consumed the interval; the first tick completes it.
                    let timer = state.lock();
                    state.ticker_tx.send_replace(true);
                    state.schedule_alarm(&timer);
                    state.persist(&timer);
                    state.refresh_display(&timer);
                } else {
                    let timer = state.lock();
                    state.refresh_display(&timer);
                }
            }
            Ok(None) => {
                info!("No stored timer state, starting fresh");
                state.reset_timer();
            }
            Err(e) => {
                warn!("Failed to restore timer state, resetting: {}", e);
                state.reset_timer();
            }
        }

        state
    }

    fn lock(&self) -> MutexGuard<'_, TimerState> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Route an inbound message to its operation and reply with the new state
    pub fn handle(&self, request: Request) -> TimerState {
        debug!("Handling message: {}", request.action());
        match request {
            Request::StartTimer(options) => self.start_timer(&options),
            Request::PauseTimer => self.pause_timer(),
            Request::ResetTimer => self.reset_timer(),
            Request::GetTimerState => self.get_timer_state(),
            Request::UpdateTaskName { task_name } => self.update_task_name(&task_name),
            Request::UpdateMode { mode } => self.update_mode(mode),
        }
    }

    pub fn start_timer(&self, options: &StartOptions) -> TimerState {
        let mut timer = self.lock();
        let completion = timer.start(options, Utc::now());
        self.ticker_tx.send_replace(true);

        if let Some(completion) = completion {
            info!("Interval ran out before start, completing it first");
            self.finish_interval(&timer, completion);
            return timer.clone();
        }

        info!(
            "Timer started: {} for {}s ({})",
            timer.phase().label(),
            timer.time_left,
            timer.task_name
        );
        self.persist(&timer);
        self.refresh_display(&timer);
        self.broadcast(&timer);
        self.schedule_alarm(&timer);
        timer.clone()
    }

    pub fn pause_timer(&self) -> TimerState {
        let mut timer = self.lock();
        timer.pause(Utc::now());
        info!("Timer paused with {}s left", timer.time_left);

        self.ticker_tx.send_replace(false);
        self.persist(&timer);
        self.refresh_display(&timer);
        self.broadcast(&timer);
        self.clear_alarm();
        timer.clone()
    }

    pub fn reset_timer(&self) -> TimerState {
        let mut timer = self.lock();
        self.ticker_tx.send_replace(false);
        timer.reset(Utc::now());
        info!("Timer reset to {}s of focus", timer.time_left);

        self.persist(&timer);
        self.refresh_display(&timer);
        self.broadcast(&timer);
        self.clear_alarm();
        timer.clone()
    }

    /// Get current timer state
    pub fn get_timer_state(&self) -> TimerState {
        self.lock().clone()
    }

    pub fn update_task_name(&self, name: &str) -> TimerState {
        let mut timer = self.lock();
        timer.set_task_name(name);
        info!("Task name set to: {}", timer.task_name);

        self.persist(&timer);
        self.broadcast(&timer);
        timer.clone()
    }

    pub fn update_mode(&self, mode: Mode) -> TimerState {
        let mut timer = self.lock();
        self.ticker_tx.send_replace(false);
        timer.set_mode(mode, Utc::now());
        info!(
            "Mode set to {} ({}m focus / {}m break)",
            timer.mode, timer.focus_time, timer.break_time
        );

        self.persist(&timer);
        self.refresh_display(&timer);
        self.broadcast(&timer);
        self.clear_alarm();
        timer.clone()
    }

    /// Tick against the wall clock
    pub fn tick(&self) -> TickOutcome {
        self.tick_at(Utc::now())
    }

    /// One cycle of the tick loop at `now`
    pub fn tick_at(&self, now: DateTime<Utc>) -> TickOutcome {
        let mut timer = self.lock();
        let outcome = timer.tick(now);
        match outcome {
            TickOutcome::Idle | TickOutcome::Waiting => {}
            TickOutcome::Counted { remaining } => {
                debug!("Tick: {}s left", remaining);
                self.refresh_display(&timer);
                self.persist(&timer);
                self.broadcast(&timer);
            }
            TickOutcome::Completed(completion) => self.finish_interval(&timer, completion),
        }
        outcome
    }

    /// Completion alarm against the wall clock
    pub fn alarm_fired(&self) -> TickOutcome {
        self.alarm_fired_at(Utc::now())
    }

    /// Backstop for a suspended tick loop.
    ///
    /// Catches up on elapsed running time and completes the interval if it
    /// is over, then re-arms the alarm from the corrected state.
    pub fn alarm_fired_at(&self, now: DateTime<Utc>) -> TickOutcome {
        let mut timer = self.lock();
        let outcome = timer.tick(now);
        match outcome {
            TickOutcome::Completed(completion) => {
                info!("Completion alarm caught an unfinished interval");
                self.finish_interval(&timer, completion);
            }
            TickOutcome::Counted { remaining } => {
                debug!("Completion alarm corrected drift, {}s left", remaining);
                self.refresh_display(&timer);
                self.persist(&timer);
                self.broadcast(&timer);
                self.schedule_alarm(&timer);
            }
            TickOutcome::Waiting => self.schedule_alarm(&timer),
            TickOutcome::Idle => self.clear_alarm(),
        }
        outcome
    }

    /// Subscribe to `timerUpdated` pushes
    pub fn subscribe(&self) -> broadcast::Receiver<Broadcast> {
        self.broadcast_tx.subscribe()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    fn finish_interval(&self, timer: &TimerState, completion: Completion) {
        info!(
            "{} finished, {} begins ({}s)",
            completion.finished.label(),
            completion.started.label(),
            timer.time_left
        );
        let notification =
            Notification::for_completion(completion, &timer.task_name, timer.sound_enabled);
        if let Err(e) = self.indicator.notify(&notification) {
            warn!("Failed to show completion notification: {}", e);
        }

        self.persist(timer);
        self.refresh_display(timer);
        self.broadcast(timer);
        self.schedule_alarm(timer);
    }

    fn persist(&self, timer: &TimerState) {
        if let Err(e) = self.store.save(timer) {
            warn!("Failed to persist timer state: {}", e);
        }
    }

    fn refresh_display(&self, timer: &TimerState) {
        if let Err(e) = self.indicator.show_badge(&Badge::from_state(timer)) {
            warn!("Failed to update badge: {}", e);
        }
    }

    fn broadcast(&self, timer: &TimerState) {
        let update = Broadcast::TimerUpdated {
            state: timer.clone(),
        };
        if self.broadcast_tx.send(update).is_err() {
            debug!("No listeners for timer update");
        }
    }

    fn schedule_alarm(&self, timer: &TimerState) {
        let deadline = timer.completion_deadline();
        if let Some(at) = deadline {
            debug!("Completion alarm set for {}", at);
        }
        self.alarm_tx.send_replace(deadline);
    }

    fn clear_alarm(&self) {
        self.alarm_tx.send_replace(None);
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("timer", &*self.lock())
            .field("ticking", &*self.ticker_tx.borrow())
            .field("alarm", &*self.alarm_tx.borrow())
            .finish()
    }
}
