//! Background tasks module
//!
//! The tick loop and the completion alarm run alongside the HTTP server and
//! both drive the same guarded tick on the state controller.

pub mod completion_alarm;
pub mod ticker;

// Re-export main functions
pub use completion_alarm::completion_alarm_task;
pub use ticker::ticker_task;
