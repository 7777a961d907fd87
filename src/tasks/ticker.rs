//! One-second tick loop background task

use std::{sync::Arc, time::Duration};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::state::AppState;

/// Background task that drives the countdown while the timer runs.
///
/// The loop is switched on and off through `AppState::ticker_tx`, and every
/// switch restarts the interval. The restarted interval fires immediately,
/// which counts nothing because less than a whole second has elapsed since
/// the start stamped `last_update_time`.
pub async fn ticker_task(state: Arc<AppState>) {
    info!("Starting tick loop task");

    let mut active_rx = state.ticker_tx.subscribe();

    loop {
        let active = *active_rx.borrow_and_update();
        if !active {
            if active_rx.changed().await.is_err() {
                break;
            }
            continue;
        }

        debug!("Tick loop (re)started");
        let mut ticks = interval(Duration::from_secs(1));
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticks.tick() => {
                    state.tick();
                }

                // Start, pause, reset and mode changes restart or stop the loop
                changed = active_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    debug!("Tick loop control changed");
                    break;
                }
            }
        }
    }
}
