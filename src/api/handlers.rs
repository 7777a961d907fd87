//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::State,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::state::{AppState, TimerState};
use super::{
    messages::{Broadcast, Request},
    responses::{HealthResponse, MessageResponse},
};

/// Handle POST /message - Dispatch one protocol message
pub async fn message_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<Request>,
) -> Json<MessageResponse> {
    let action = request.action();
    let timer = state.handle(request);
    Json(MessageResponse::ok(action, timer))
}

/// Handle GET /state - Snapshot of the timer record
pub async fn state_handler(State(state): State<Arc<AppState>>) -> Json<TimerState> {
    Json(state.get_timer_state())
}

/// Handle GET /events - Stream `timerUpdated` pushes as server-sent events
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("Popup listener connected");
    let rx = state.subscribe();

    let updates = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(update) => return Some((broadcast_event(&update), rx)),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Popup listener lagged, skipped {} updates", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(updates).keep_alive(KeepAlive::default())
}

fn broadcast_event(update: &Broadcast) -> Result<Event, Infallible> {
    let event = Event::default().event("timerUpdated");
    Ok(match serde_json::to_string(update) {
        Ok(json) => event.data(json),
        Err(e) => {
            warn!("Failed to serialize timer update: {}", e);
            event.comment("serialization failed")
        }
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse::ok(state.get_uptime()))
}
