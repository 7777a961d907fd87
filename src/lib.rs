//! Pomodoro Daemon - A state-managed Pomodoro timer
//!
//! The state controller owns a single timer record, drives it with a
//! one-second tick backed by a completion alarm, persists it after every
//! mutation and pushes updates to any listening popup. The popup side renders
//! that record and turns user actions into protocol messages.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod tasks;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::{PomodoroError, Result};
pub use state::{AppState, TimerState};
pub use utils::signals::shutdown_signal;
