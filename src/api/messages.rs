//! Message protocol between the popup and the state controller

use serde::{Deserialize, Serialize};

use crate::state::{Mode, StartOptions, TimerState};

/// Inbound message, tagged by its `action` field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    StartTimer(StartOptions),
    PauseTimer,
    ResetTimer,
    GetTimerState,
    #[serde(rename_all = "camelCase")]
    UpdateTaskName {
        task_name: String,
    },
    UpdateMode {
        mode: Mode,
    },
}

impl Request {
    /// Wire name of the action
    pub fn action(&self) -> &'static str {
        match self {
            Request::StartTimer(_) => "startTimer",
            Request::PauseTimer => "pauseTimer",
            Request::ResetTimer => "resetTimer",
            Request::GetTimerState => "getTimerState",
            Request::UpdateTaskName { .. } => "updateTaskName",
            Request::UpdateMode { .. } => "updateMode",
        }
    }
}

/// Outbound push to any listening popup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Broadcast {
    TimerUpdated { state: TimerState },
}

impl Broadcast {
    pub fn state(&self) -> &TimerState {
        match self {
            Broadcast::TimerUpdated { state } => state,
        }
    }
}
