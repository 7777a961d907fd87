//! Popup UI module
//!
//! Renders the timer record and turns user actions into protocol messages.
//! The popup holds only a rendered snapshot; the state controller stays
//! authoritative.

pub mod controller;
pub mod transport;
pub mod view;

// Re-export main types
pub use controller::{PopupController, UserAction};
pub use transport::{LocalTransport, Transport};
pub use view::PopupView;
