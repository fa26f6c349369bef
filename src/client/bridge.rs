/**
 * Socket Event Bridge
 *
 * Holds at most one WebSocket connection to `/socket` and re-dispatches each
 * inbound `{event, data}` frame through an [`EventDispatcher`] by name.
 *
 * # Local lifecycle events
 *
 * - `connect` after the handshake succeeds
 * - `connect_error` with `{message, status?}` when it fails
 * - `disconnect` with `{reason}` when the connection ends for any reason
 *
 * There is no automatic reconnection; call `connect` again.
 */
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::{HeaderValue, AUTHORIZATION};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::connect_async;

use crate::client::config::ClientConfig;
use crate::client::dispatch::{EventDispatcher, SubscriptionId};
use crate::client::error::ClientError;
use crate::shared::event::{ClientMessage, EventEnvelope};

pub const CONNECT_EVENT: &str = "connect";
pub const CONNECT_ERROR_EVENT: &str = "connect_error";
pub const DISCONNECT_EVENT: &str = "disconnect";

struct Session {
    outbound: mpsc::UnboundedSender<ClientMessage>,
    task: JoinHandle<()>,
}

pub struct EventBridge {
    socket_url: String,
    dispatcher: EventDispatcher,
    connected: Arc<AtomicBool>,
    session: Option<Session>,
}

impl EventBridge {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_dispatcher(config, EventDispatcher::new())
    }

    pub fn with_dispatcher(config: &ClientConfig, dispatcher: EventDispatcher) -> Self {
        Self {
            socket_url: config.socket_url(),
            dispatcher,
            connected: Arc::new(AtomicBool::new(false)),
            session: None,
        }
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// Shorthand for `dispatcher().on(..)`.
    pub fn on<F>(&self, event: &str, listener: F) -> SubscriptionId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.dispatcher.on(event, listener)
    }

    pub fn off(&self, event: &str, id: SubscriptionId) -> bool {
        self.dispatcher.off(event, id)
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Open the socket, authenticating with `token`. No-op when already connected.
    pub async fn connect(&mut self, token: &str) -> Result<(), ClientError> {
        if self.is_connected() {
            return Ok(());
        }
        if let Some(stale) = self.session.take() {
            stale.task.abort();
        }

        let mut request = self.socket_url.as_str().into_client_request()?;
        request
            .headers_mut()
            .insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);

        let stream = match connect_async(request).await {
            Ok((stream, _response)) => stream,
            Err(e) => {
                let status = match &e {
                    WsError::Http(response) => Some(response.status().as_u16()),
                    _ => None,
                };
                tracing::warn!("Socket handshake failed: {}", e);
                self.dispatcher.emit(
                    CONNECT_ERROR_EVENT,
                    &json!({ "message": e.to_string(), "status": status }),
                );
                return Err(e.into());
            }
        };

        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        self.connected.store(true, Ordering::SeqCst);
        self.dispatcher.emit(CONNECT_EVENT, &Value::Null);

        let task = tokio::spawn(run_session(
            stream,
            outbound_rx,
            self.dispatcher.clone(),
            Arc::clone(&self.connected),
        ));
        self.session = Some(Session { outbound, task });
        Ok(())
    }

    pub fn send(&self, message: ClientMessage) -> Result<(), ClientError> {
        let session = self
            .session
            .as_ref()
            .filter(|_| self.is_connected())
            .ok_or(ClientError::NotConnected)?;
        session
            .outbound
            .send(message)
            .map_err(|_| ClientError::NotConnected)
    }

    pub fn ping(&self) -> Result<(), ClientError> {
        self.send(ClientMessage::Ping)
    }

    pub fn join_room(&self, room: impl Into<String>) -> Result<(), ClientError> {
        self.send(ClientMessage::JoinRoom(room.into()))
    }

    pub fn leave_room(&self, room: impl Into<String>) -> Result<(), ClientError> {
        self.send(ClientMessage::LeaveRoom(room.into()))
    }

    /// Close the socket and wait for the session task to finish.
    pub async fn disconnect(&mut self) {
        if let Some(Session { outbound, task }) = self.session.take() {
            drop(outbound);
            if let Err(e) = task.await {
                tracing::debug!("Socket session task ended abnormally: {}", e);
            }
        }
        self.connected.store(false, Ordering::SeqCst);
    }
}

impl Drop for EventBridge {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            session.task.abort();
        }
    }
}

async fn run_session<S>(
    stream: S,
    mut outbound_rx: mpsc::UnboundedReceiver<ClientMessage>,
    dispatcher: EventDispatcher,
    connected: Arc<AtomicBool>,
) where
    S: futures_util::Stream<Item = Result<Message, WsError>>
        + futures_util::Sink<Message, Error = WsError>
        + Unpin,
{
    let (mut sink, mut frames) = stream.split();

    let reason = loop {
        tokio::select! {
            frame = frames.next() => match frame {
                Some(Ok(Message::Text(text))) => dispatch_frame(&dispatcher, text.as_str()),
                Some(Ok(Message::Close(_))) | None => break "server closed the connection",
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!("Socket read failed: {}", e);
                    break "transport error";
                }
            },
            outgoing = outbound_rx.recv() => match outgoing {
                Some(message) => {
                    let text = match serde_json::to_string(&message) {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::warn!("Failed to encode client frame: {}", e);
                            continue;
                        }
                    };
                    if let Err(e) = sink.send(Message::text(text)).await {
                        tracing::debug!("Socket write failed: {}", e);
                        break "transport error";
                    }
                }
                None => {
                    let _ = sink.send(Message::Close(None)).await;
                    break "client disconnect";
                }
            },
        }
    };

    connected.store(false, Ordering::SeqCst);
    dispatcher.emit(DISCONNECT_EVENT, &json!({ "reason": reason }));
}

fn dispatch_frame(dispatcher: &EventDispatcher, text: &str) {
    match serde_json::from_str::<EventEnvelope>(text) {
        Ok(envelope) => {
            dispatcher.emit(&envelope.event, &envelope.data);
        }
        Err(e) => tracing::warn!("Ignoring malformed socket frame: {}", e),
    }
}
