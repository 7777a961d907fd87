//! End-to-end checks of the HTTP message surface

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use pomodoro_daemon::{
    create_router,
    services::{MemoryStore, RecordingIndicator, StateStore},
    AppState,
};

fn app() -> (Router, Arc<AppState>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState::restore(
        store.clone(),
        Arc::new(RecordingIndicator::new()),
    ));
    (create_router(Arc::clone(&state)), state, store)
}

async fn post_message(app: &Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::post("/message")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn start_message_runs_the_default_focus_interval() {
    let (app, _, store) = app();

    let (status, reply) = post_message(&app, json!({ "action": "startTimer" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["status"], "ok");
    assert_eq!(reply["action"], "startTimer");
    assert_eq!(reply["state"]["timeLeft"], 1500);
    assert_eq!(reply["state"]["isRunning"], true);
    assert!(store.load().unwrap().unwrap().is_running);
}

#[tokio::test]
async fn update_mode_message_applies_preset() {
    let (app, state, _) = app();

    let (_, reply) = post_message(&app, json!({ "action": "updateMode", "mode": "50-10" })).await;

    assert_eq!(reply["state"]["focusTime"], 50);
    assert_eq!(reply["state"]["breakTime"], 10);
    assert_eq!(reply["state"]["timeLeft"], 3000);
    assert_eq!(state.get_timer_state().focus_time, 50);
}

#[tokio::test]
async fn whitespace_task_name_becomes_placeholder() {
    let (app, _, _) = app();

    let (_, reply) = post_message(
        &app,
        json!({ "action": "updateTaskName", "taskName": "    " }),
    )
    .await;

    assert_eq!(reply["state"]["taskName"], "Pomodoro Session");
}

#[tokio::test]
async fn malformed_messages_are_rejected_without_touching_state() {
    let (app, state, _) = app();
    let before = state.get_timer_state();

    let (status, _) = post_message(&app, json!({ "action": "updateMode", "mode": "1-1" })).await;
    assert!(status.is_client_error());

    let (status, _) = post_message(&app, json!({ "action": "launchRocket" })).await;
    assert!(status.is_client_error());

    assert_eq!(state.get_timer_state(), before);
}

#[tokio::test]
async fn state_and_health_endpoints_respond() {
    let (app, _, _) = app();

    let response = app
        .clone()
        .oneshot(Request::get("/state").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let state: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(state["mode"], "25-5");
    assert_eq!(state["isFocus"], true);

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let health: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn messages_are_broadcast_to_listeners() {
    let (app, state, _) = app();
    let mut updates = state.subscribe();

    post_message(&app, json!({ "action": "startTimer", "taskName": "Slides" })).await;

    let update = updates.recv().await.unwrap();
    let value = serde_json::to_value(&update).unwrap();
    assert_eq!(value["action"], "timerUpdated");
    assert_eq!(value["state"]["taskName"], "Slides");
}
