/**
 * WebSocket Endpoint
 *
 * `GET /socket` upgrades to a WebSocket after the handshake credential has
 * been verified. The token is taken from the `token` query parameter or the
 * `Authorization` header (bare or `Bearer `-prefixed). A rejected handshake
 * gets the usual JSON error response and never reaches the registry.
 *
 * # Per-connection Loop
 *
 * One task per socket selects between:
 * - the connection's outbound queue (fed by the registry), and
 * - inbound frames from the client (`join_room`, `leave_room`, `ping`)
 *
 * Replies to client frames are written directly, not through the queue.
 * When the registry drops the connection's sender (superseded or evicted),
 * the queue ends and the loop closes the socket.
 */

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::{header::AUTHORIZATION, HeaderMap},
    response::Response,
};
use chrono::Utc;
use futures_util::{
    sink::{Sink, SinkExt},
    stream::StreamExt,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::backend::auth::identity::{authenticate, handshake_token};
use crate::backend::error::BackendError;
use crate::backend::realtime::registry::{connection_channel, ConnectionRegistry};
use crate::backend::server::state::AppState;
use crate::shared::event::{personal_room, ClientMessage, ServerMessage};
use crate::shared::user::UserProfile;

#[derive(Debug, Default, Deserialize)]
pub struct HandshakeQuery {
    pub token: Option<String>,
}

pub async fn socket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<HandshakeQuery>,
    headers: HeaderMap,
) -> Result<Response, BackendError> {
    let header = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok());
    let token = handshake_token(query.token.as_deref().or(header))
        .inspect_err(|_| tracing::warn!("[Realtime] Handshake without credential"))?
        .to_owned();

    let user = authenticate(&state.db_pool, &state.tokens, &token).await?;
    let profile = user.profile();

    tracing::info!("[Realtime] Handshake accepted for user {} ({})", profile.id, profile.email);

    Ok(ws.on_upgrade(move |socket| run_connection(socket, state.registry, profile)))
}

async fn run_connection(socket: WebSocket, registry: ConnectionRegistry, user: UserProfile) {
    let (tx, mut outbound) = connection_channel();
    let registration = registry.register(user.clone(), tx);
    let connection_id = registration.connection_id;

    if let Some(superseded) = registration.superseded {
        superseded.notify_and_close(ServerMessage::SessionSuperseded {
            message: "Signed in from another connection".to_string(),
        });
    }

    registry.join_room(user.id, connection_id, personal_room(user.id));

    tracing::info!(
        "[Realtime] User {} connected ({} live connections)",
        user.id,
        registry.connection_count()
    );

    let (mut sink, mut stream) = socket.split();

    let connected = ServerMessage::Connected {
        message: "Successfully connected to real-time updates".to_string(),
        user: user.clone(),
    };

    if send_frame(&mut sink, &connected).await {
        loop {
            tokio::select! {
                queued = outbound.recv() => match queued {
                    Some(message) => {
                        if !send_frame(&mut sink, &message).await {
                            break;
                        }
                    }
                    None => {
                        tracing::debug!("[Realtime] Connection {} released by registry", connection_id);
                        break;
                    }
                },
                inbound = stream.next() => match inbound {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_client_frame(&registry, &user, connection_id, text.as_str());
                        if !send_frame(&mut sink, &reply).await {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!("[Realtime] Socket error for user {}: {}", user.id, e);
                        break;
                    }
                },
            }
        }
    }

    registry.unregister(user.id, connection_id);
    let _ = sink.close().await;

    tracing::info!(
        "[Realtime] User {} disconnected ({} live connections)",
        user.id,
        registry.connection_count()
    );
}

/// Serialize and write one frame; `false` once the socket is gone.
async fn send_frame<S>(sink: &mut S, message: &ServerMessage) -> bool
where
    S: Sink<Message> + Unpin,
{
    let text = match serde_json::to_string(message) {
        Ok(text) => text,
        Err(e) => {
            tracing::error!("[Realtime] Failed to serialize {}: {}", message.name(), e);
            return true;
        }
    };
    sink.send(Message::Text(text.into())).await.is_ok()
}

/// Reply to one inbound text frame.
pub fn handle_client_frame(
    registry: &ConnectionRegistry,
    user: &UserProfile,
    connection_id: Uuid,
    text: &str,
) -> ServerMessage {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::debug!("[Realtime] Unrecognized frame from user {}: {}", user.id, e);
            return ServerMessage::error("Unrecognized event");
        }
    };

    match message {
        ClientMessage::Ping => ServerMessage::Pong {
            timestamp: Utc::now().to_rfc3339(),
        },
        ClientMessage::JoinRoom(room) if room.trim().is_empty() => {
            ServerMessage::error("Room name is required")
        }
        ClientMessage::JoinRoom(room) => {
            registry.join_room(user.id, connection_id, room.clone());
            tracing::debug!("[Realtime] User {} joined room {}", user.id, room);
            ServerMessage::RoomJoined { room }
        }
        ClientMessage::LeaveRoom(room) => {
            registry.leave_room(user.id, connection_id, &room);
            tracing::debug!("[Realtime] User {} left room {}", user.id, room);
            ServerMessage::RoomLeft { room }
        }
    }
}
