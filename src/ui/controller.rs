//! Popup controller: user intent in, rendered state out

use tracing::debug;

use super::{transport::Transport, view::PopupView};
use crate::{
    api::messages::{Broadcast, Request},
    error::Result,
    state::{Mode, StartOptions, TimerState, DEFAULT_TASK_NAME},
};

/// Something the user did in the popup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    /// Start button, carrying the current task field text.
    Start { task_input: String },
    Pause,
    Reset,
    SetMode(Mode),
    SetSound(bool),
    /// The task field was edited.
    EditTask(String),
}

fn task_from_input(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        DEFAULT_TASK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

impl UserAction {
    /// The protocol message this action sends
    pub fn into_request(self) -> Request {
        match self {
            UserAction::Start { task_input } => Request::StartTimer(StartOptions {
                task_name: Some(task_from_input(&task_input)),
                ..StartOptions::default()
            }),
            UserAction::Pause => Request::PauseTimer,
            UserAction::Reset => Request::ResetTimer,
            UserAction::SetMode(mode) => Request::UpdateMode { mode },
            // The sound toggle rides on startTimer, which also resumes the timer.
            UserAction::SetSound(enabled) => Request::StartTimer(StartOptions {
                sound_enabled: Some(enabled),
                ..StartOptions::default()
            }),
            UserAction::EditTask(input) => Request::UpdateTaskName {
                task_name: task_from_input(&input),
            },
        }
    }
}

/// Holds the rendered snapshot; never keeps time on its own
#[derive(Debug)]
pub struct PopupController<T> {
    transport: T,
    view: Option<PopupView>,
}

impl<T: Transport> PopupController<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            view: None,
        }
    }

    /// Ask the controller for its state instead of assuming defaults
    pub async fn load(&mut self) -> Result<&PopupView> {
        let state = self.transport.send(Request::GetTimerState).await?;
        Ok(self.render(&state))
    }

    pub async fn dispatch(&mut self, action: UserAction) -> Result<&PopupView> {
        let request = action.into_request();
        debug!("Popup sending {}", request.action());
        let state = self.transport.send(request).await?;
        Ok(self.render(&state))
    }

    /// Apply a pushed update immediately
    pub fn apply(&mut self, broadcast: &Broadcast) -> &PopupView {
        self.render(broadcast.state())
    }

    pub fn view(&self) -> Option<&PopupView> {
        self.view.as_ref()
    }

    fn render(&mut self, state: &TimerState) -> &PopupView {
        self.view.insert(PopupView::render(state))
    }
}
