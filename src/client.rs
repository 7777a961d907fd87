//! HTTP transport for driving a running daemon from the terminal popup

use futures::{stream, Stream, StreamExt};
use tracing::{debug, warn};

use crate::{
    api::{
        messages::{Broadcast, Request},
        responses::MessageResponse,
    },
    error::{PomodoroError, Result},
    state::TimerState,
    ui::Transport,
};

/// Sends protocol messages to `POST /message` and follows `GET /events`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Stream of `timerUpdated` broadcasts from the daemon
    pub async fn subscribe(&self) -> Result<impl Stream<Item = Broadcast>> {
        let response = self
            .client
            .get(format!("{}/events", self.base_url))
            .send()
            .await?
            .error_for_status()?;

        let bytes = Box::pin(response.bytes_stream());
        let events = stream::unfold(
            (bytes, SseBuffer::default()),
            |(mut bytes, mut buffer)| async move {
                loop {
                    if let Some(update) = buffer.next_broadcast() {
                        return Some((update, (bytes, buffer)));
                    }
                    match bytes.next().await {
                        Some(Ok(chunk)) => buffer.push(&chunk),
                        Some(Err(e)) => {
                            warn!("Event stream failed: {}", e);
                            return None;
                        }
                        None => return None,
                    }
                }
            },
        );
        Ok(events)
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<TimerState> {
        debug!("POST {}/message ({})", self.base_url, request.action());
        let response = self
            .client
            .post(format!("{}/message", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PomodoroError::Transport(format!(
                "daemon rejected {}: {}",
                request.action(),
                response.status()
            )));
        }
        let reply: MessageResponse = response.json().await?;
        Ok(reply.state)
    }
}

/// Accumulates server-sent event bytes and yields complete `data:` payloads
#[derive(Debug, Default)]
struct SseBuffer {
    pending: Vec<u8>,
}

impl SseBuffer {
    fn push(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);
    }

    fn next_broadcast(&mut self) -> Option<Broadcast> {
        while let Some(end) = self.pending.windows(2).position(|w| w == b"\n\n") {
            let block: Vec<u8> = self.pending.drain(..end + 2).collect();
            let block = String::from_utf8_lossy(&block);
            let data: Vec<&str> = block
                .lines()
                .filter_map(|line| line.strip_prefix("data:"))
                .map(str::trim_start)
                .collect();
            if data.is_empty() {
                // keep-alive or comment
                continue;
            }
            match serde_json::from_str(&data.join("\n")) {
                Ok(update) => return Some(update),
                Err(e) => warn!("Ignoring malformed timer update: {}", e),
            }
        }
        None
    }
}
