//! Completion alarm background task

use std::{sync::Arc, time::Duration};
use chrono::Utc;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::state::AppState;

/// Background task that fires when the current interval is due to end.
///
/// It backs up the tick loop: if ticks were suspended, the alarm catches up
/// on the elapsed time through the same guarded tick, so it can never count
/// a second twice.
pub async fn completion_alarm_task(state: Arc<AppState>) {
    info!("Starting completion alarm task");

    let mut deadline_rx = state.alarm_tx.subscribe();

    loop {
        let deadline = *deadline_rx.borrow_and_update();

        let Some(at) = deadline else {
            if deadline_rx.changed().await.is_err() {
                break;
            }
            continue;
        };

        let wait = (at - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        debug!("Completion alarm armed, firing in {}s", wait.as_secs());

        tokio::select! {
            _ = sleep(wait) => {
                debug!("Completion alarm fired");
                // Re-arms or clears the deadline, which wakes the next iteration.
                state.alarm_fired();
            }

            changed = deadline_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
}
