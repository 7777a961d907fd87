//! How the popup reaches the state controller

use std::{future::Future, sync::Arc};

use crate::{
    api::messages::Request,
    error::Result,
    state::{AppState, TimerState},
};

/// Delivers a message to the state controller and returns its reply state
pub trait Transport {
    fn send(&self, request: Request) -> impl Future<Output = Result<TimerState>> + Send;
}

/// Talks to a controller living in the same process
#[derive(Debug, Clone)]
pub struct LocalTransport {
    state: Arc<AppState>,
}

impl LocalTransport {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

impl Transport for LocalTransport {
    async fn send(&self, request: Request) -> Result<TimerState> {
        Ok(self.state.handle(request))
    }
}
