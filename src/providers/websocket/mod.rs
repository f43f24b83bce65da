pub mod protocol;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt, stream};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::core::error::{ChatError, Result};
use crate::core::llm::ChatModel;
use crate::core::types::{CompletionRequest, StreamEvent, StreamResponse};

pub use protocol::{ClientFrame, ServerFrame};

pub const DEFAULT_URL: &str = "ws://localhost:8000/ws";
pub const DEFAULT_RECONNECT_ATTEMPTS: u32 = 5;
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(2000);

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone)]
pub struct WebSocketConfig {
    pub url: String,
    pub reconnect_attempts: u32,
    pub reconnect_delay: Duration,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            reconnect_attempts: DEFAULT_RECONNECT_ATTEMPTS,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}

/// Stateful chat transport. The server keeps its own history, so only the
/// newest user entry is sent per request. One reply at a time holds the
/// socket; a reply dropped before completion closes the connection so stale
/// frames never leak into the next one.
pub struct WebSocketTransport {
    config: WebSocketConfig,
    socket: Arc<Mutex<Option<Socket>>>,
}

impl WebSocketTransport {
    #[must_use]
    pub fn new(config: WebSocketConfig) -> Self {
        Self {
            config,
            socket: Arc::new(Mutex::new(None)),
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.config.url
    }

    async fn send_frame(&self, guard: &mut OwnedMutexGuard<Option<Socket>>, payload: &str) -> Result<()> {
        if guard.is_none() {
            **guard = Some(connect(&self.config).await?);
        }
        let Some(socket) = guard.as_mut() else {
            return Err(ChatError::Transport("connection unavailable".to_string()));
        };

        if let Err(e) = socket.send(Message::Text(payload.to_string())).await {
            tracing::warn!(error = %e, "Send failed, reconnecting");
            **guard = Some(reconnect_and_send(&self.config, payload).await?);
        }

        Ok(())
    }
}

/// Opens a connection, retrying up to `reconnect_attempts` times with a fixed
/// delay between attempts.
async fn connect(config: &WebSocketConfig) -> Result<Socket> {
    let attempts = config.reconnect_attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        match connect_async(config.url.as_str()).await {
            Ok((socket, _)) => {
                tracing::info!(url = %config.url, attempt, "WebSocket connected");
                return Ok(socket);
            }
            Err(e) => {
                tracing::warn!(
                    url = %config.url,
                    attempt,
                    max_attempts = attempts,
                    error = %e,
                    "WebSocket connect failed"
                );
                last_error = e.to_string();
                if attempt < attempts {
                    tokio::time::sleep(config.reconnect_delay).await;
                }
            }
        }
    }

    Err(ChatError::Transport(format!(
        "could not connect to {} after {attempts} attempts: {last_error}",
        config.url
    )))
}

async fn reconnect_and_send(config: &WebSocketConfig, payload: &str) -> Result<Socket> {
    let mut fresh = connect(config).await?;
    fresh
        .send(Message::Text(payload.to_string()))
        .await
        .map_err(|e| ChatError::Transport(e.to_string()))?;
    Ok(fresh)
}

impl std::fmt::Debug for WebSocketTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSocketTransport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

struct ReplyState {
    guard: OwnedMutexGuard<Option<Socket>>,
    config: WebSocketConfig,
    payload: String,
    /// Set once any frame of this reply arrived; after that a lost
    /// connection fails the reply instead of resending the prompt.
    answered: bool,
    resent: bool,
    complete: bool,
}

impl ReplyState {
    fn fail(&mut self, message: String) -> Vec<Result<StreamEvent>> {
        self.complete = true;
        *self.guard = None;
        vec![Err(ChatError::Transport(message))]
    }

    /// A socket the server closed while idle still accepts the write, so the
    /// loss only shows up here. The prompt is resent once over a fresh
    /// connection if nothing of the reply had arrived yet.
    async fn connection_lost(&mut self, reason: String) -> Vec<Result<StreamEvent>> {
        if self.answered || self.resent {
            return self.fail(reason);
        }
        self.resent = true;
        *self.guard = None;
        tracing::info!(%reason, "Connection lost before the reply started, resending");

        match reconnect_and_send(&self.config, &self.payload).await {
            Ok(socket) => {
                *self.guard = Some(socket);
                Vec::new()
            }
            Err(e) => self.fail(e.to_string()),
        }
    }

    async fn next_events(&mut self) -> Vec<Result<StreamEvent>> {
        let Some(socket) = self.guard.as_mut() else {
            return self.fail("connection unavailable".to_string());
        };

        match socket.next().await {
            Some(Ok(Message::Text(text))) => {
                self.answered = true;
                let events = ServerFrame::decode(&text)
                    .map(ServerFrame::into_events)
                    .unwrap_or_default();
                if events.contains(&StreamEvent::MessageStop) {
                    self.complete = true;
                }
                events.into_iter().map(Ok).collect()
            }
            Some(Ok(Message::Close(frame))) => {
                tracing::debug!(?frame, "Server closed connection");
                self.connection_lost("connection closed by server".to_string()).await
            }
            Some(Ok(_)) => Vec::new(),
            Some(Err(e)) => self.connection_lost(e.to_string()).await,
            None => self.connection_lost("connection closed".to_string()).await,
        }
    }
}

impl Drop for ReplyState {
    fn drop(&mut self) {
        if !self.complete {
            tracing::debug!("Reply abandoned, dropping WebSocket connection");
            *self.guard = None;
        }
    }
}

#[async_trait]
impl ChatModel for WebSocketTransport {
    fn name(&self) -> &'static str {
        "websocket"
    }

    fn model(&self) -> &str {
        &self.config.url
    }

    async fn stream(&self, request: CompletionRequest) -> Result<StreamResponse> {
        let content = request
            .last_user_message()
            .map(|m| m.content().to_string())
            .ok_or_else(|| ChatError::Transport("no user message to send".to_string()))?;

        let payload = serde_json::to_string(&ClientFrame::user(content))?;
        let mut guard = Arc::clone(&self.socket).lock_owned().await;
        self.send_frame(&mut guard, &payload).await?;

        let state = ReplyState {
            guard,
            config: self.config.clone(),
            payload,
            answered: false,
            resent: false,
            complete: false,
        };

        let events = stream::unfold(Some(state), |state| async move {
            let mut state = state?;
            if state.complete {
                return None;
            }
            let events = state.next_events().await;
            Some((stream::iter(events), Some(state)))
        })
        .flatten();

        Ok(Box::pin(events))
    }
}
