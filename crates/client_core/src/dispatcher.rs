//! Command Dispatcher: arrow keys in, `{"action": ...}` frames out.
//!
//! Delivery is fire-and-forget. There is no acknowledgement, retry, queueing
//! or debouncing; a held key produces one frame per key event, and once the
//! channel is gone every later action is dropped until a new dispatcher is
//! opened.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use async_trait::async_trait;
use futures::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use shared::{
    domain::{DirectionalAction, KeyEvent},
    error::ChannelError,
    protocol::ActionEnvelope,
};
use tokio::{net::TcpStream, sync::broadcast, task::JoinHandle};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_SIMULATOR_URL: &str = "ws://127.0.0.1:5001";

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Closed { reason: String },
}

/// Outbound half of the simulator channel.
#[async_trait]
pub trait ChannelTransport: Send {
    async fn send_text(&mut self, text: String) -> Result<(), ChannelError>;
    async fn close(&mut self) -> Result<(), ChannelError>;
}

/// Stand-in used once the channel is gone or never opened.
pub struct ClosedTransport;

#[async_trait]
impl ChannelTransport for ClosedTransport {
    async fn send_text(&mut self, _text: String) -> Result<(), ChannelError> {
        Err(ChannelError::Closed)
    }

    async fn close(&mut self) -> Result<(), ChannelError> {
        Ok(())
    }
}

pub struct WsTransport {
    sink: SplitSink<WsStream, Message>,
}

#[async_trait]
impl ChannelTransport for WsTransport {
    async fn send_text(&mut self, text: String) -> Result<(), ChannelError> {
        self.sink
            .send(Message::Text(text))
            .await
            .map_err(|err| ChannelError::Send(err.to_string()))
    }

    async fn close(&mut self) -> Result<(), ChannelError> {
        self.sink
            .close()
            .await
            .map_err(|err| ChannelError::Send(err.to_string()))
    }
}

pub fn encode_action(action: DirectionalAction) -> Result<String, ChannelError> {
    Ok(serde_json::to_string(&ActionEnvelope::new(action))?)
}

/// Normalizes the simulator address. `http`/`https` are rewritten to
/// `ws`/`wss`.
pub fn websocket_url(raw: &str) -> Result<String, ChannelError> {
    let mut url = Url::parse(raw).map_err(|_| ChannelError::InvalidUrl(raw.to_string()))?;
    let scheme = match url.scheme() {
        "ws" | "wss" => return Ok(url.to_string()),
        "http" => "ws",
        "https" => "wss",
        _ => return Err(ChannelError::InvalidUrl(raw.to_string())),
    };
    url.set_scheme(scheme)
        .map_err(|()| ChannelError::InvalidUrl(raw.to_string()))?;
    Ok(url.to_string())
}

pub struct CommandDispatcher {
    url: String,
    transport: Box<dyn ChannelTransport>,
    open: Arc<AtomicBool>,
    events: broadcast::Sender<ChannelEvent>,
    reader: Option<JoinHandle<()>>,
    sent: u64,
}

impl CommandDispatcher {
    /// Opens the simulator channel eagerly. A failed connect is logged and
    /// swallowed; the dispatcher then starts out closed.
    pub async fn open(url: &str) -> Self {
        match connect(url).await {
            Ok((ws_url, stream)) => {
                let (sink, stream) = stream.split();
                let mut dispatcher = Self::with_transport(ws_url, Box::new(WsTransport { sink }));
                dispatcher.reader = Some(spawn_reader(
                    stream,
                    Arc::clone(&dispatcher.open),
                    dispatcher.events.clone(),
                ));
                info!(url = %dispatcher.url, "dispatcher: simulator channel open");
                dispatcher
            }
            Err(err) => {
                warn!(%url, error = %err, "dispatcher: simulator channel unavailable; actions will be dropped");
                Self::closed(url)
            }
        }
    }

    /// Wraps an already-open transport.
    pub fn with_transport(url: impl Into<String>, transport: Box<dyn ChannelTransport>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            url: url.into(),
            transport,
            open: Arc::new(AtomicBool::new(true)),
            events,
            reader: None,
            sent: 0,
        }
    }

    pub fn closed(url: impl Into<String>) -> Self {
        let dispatcher = Self::with_transport(url, Box::new(ClosedTransport));
        dispatcher.open.store(false, Ordering::SeqCst);
        dispatcher
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> ChannelState {
        if self.open.load(Ordering::SeqCst) {
            ChannelState::Open
        } else {
            ChannelState::Closed
        }
    }

    /// Frames handed to the transport without error.
    pub fn sent_count(&self) -> u64 {
        self.sent
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChannelEvent> {
        self.events.subscribe()
    }

    /// Maps one key event and transmits the resulting action right away.
    /// Non-arrow keys produce nothing and are dropped without a trace.
    pub async fn handle_key(&mut self, event: &KeyEvent) -> Option<DirectionalAction> {
        let action = DirectionalAction::from_key(&event.key)?;
        self.transmit(action).await;
        Some(action)
    }

    pub async fn transmit(&mut self, action: DirectionalAction) {
        if self.state() == ChannelState::Closed {
            debug!(action = action.as_str(), "dispatcher: channel closed, action dropped");
            return;
        }
        let frame = match encode_action(action) {
            Ok(frame) => frame,
            Err(err) => {
                debug!(error = %err, "dispatcher: action dropped");
                return;
            }
        };
        match self.transport.send_text(frame).await {
            Ok(()) => {
                self.sent += 1;
                debug!(action = action.as_str(), sent = self.sent, "dispatcher: action sent");
            }
            Err(err) => {
                debug!(action = action.as_str(), error = %err, "dispatcher: send failed, action dropped");
            }
        }
    }

    /// Terminal transition. Stops the reader, sends a close frame and makes
    /// every later action a no-op. Calling it twice is harmless.
    pub async fn close(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        let was_open = self.open.swap(false, Ordering::SeqCst);
        if let Err(err) = self.transport.close().await {
            debug!(error = %err, "dispatcher: close frame not delivered");
        }
        self.transport = Box::new(ClosedTransport);
        if was_open {
            let _ = self.events.send(ChannelEvent::Closed {
                reason: "closed by view".to_string(),
            });
            info!(url = %self.url, sent = self.sent, "dispatcher: simulator channel closed");
        }
    }
}

impl Drop for CommandDispatcher {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

async fn connect(url: &str) -> Result<(String, WsStream), ChannelError> {
    let ws_url = websocket_url(url)?;
    let (stream, _) = connect_async(ws_url.as_str())
        .await
        .map_err(|err| ChannelError::Connect {
            url: ws_url.clone(),
            message: err.to_string(),
        })?;
    Ok((ws_url, stream))
}

// Inbound frames carry nothing this client consumes; the reader only exists to
// notice when the simulator goes away.
fn spawn_reader(
    mut stream: SplitStream<WsStream>,
    open: Arc<AtomicBool>,
    events: broadcast::Sender<ChannelEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let reason = loop {
            match stream.next().await {
                Some(Ok(Message::Close(frame))) => {
                    break match frame {
                        Some(frame) => format!("peer closed: {} {}", u16::from(frame.code), frame.reason),
                        None => "peer closed".to_string(),
                    };
                }
                Some(Ok(msg)) => debug!(len = msg.len(), "dispatcher: inbound frame ignored"),
                Some(Err(err)) => break format!("receive failed: {err}"),
                None => break "stream ended".to_string(),
            }
        };
        if open.swap(false, Ordering::SeqCst) {
            warn!(%reason, "dispatcher: simulator channel closed");
            let _ = events.send(ChannelEvent::Closed { reason });
        }
    })
}

#[cfg(test)]
#[path = "tests/dispatcher_tests.rs"]
mod tests;
