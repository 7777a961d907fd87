//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::TimerState;

/// Reply to every inbound message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub status: String,
    pub action: String,
    pub timestamp: DateTime<Utc>,
    pub state: TimerState,
}

impl MessageResponse {
    /// Create an ok response for a handled action
    pub fn ok(action: &str, state: TimerState) -> Self {
        Self {
            status: "ok".to_string(),
            action: action.to_string(),
            timestamp: Utc::now(),
            state,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub uptime: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok(uptime: String) -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime,
        }
    }
}
