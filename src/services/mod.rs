//! External collaborator module
//!
//! Storage for the persisted timer record and the indicator that renders
//! badges and notifications.

pub mod indicator;
pub mod storage;

// Re-export main types
pub use indicator::{DesktopIndicator, Indicator, LogIndicator, RecordingIndicator};
pub use storage::{JsonFileStore, MemoryStore, StateStore, STORAGE_KEY};
