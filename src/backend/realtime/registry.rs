/**
 * Connection Registry
 *
 * Process-local map from user id to that user's single live socket
 * connection. The registry owns each connection's outbound sender: removing
 * an entry drops the sender, which ends the connection's outbound stream and
 * closes the socket.
 *
 * # Connection Lifecycle
 *
 * ```text
 * Connecting ──(handshake ok)──▶ Authenticated ──(close / superseded)──▶ Disconnected
 * ```
 *
 * A failed handshake never reaches `register`. A second connection from the
 * same user replaces the first; `register` hands the replaced entry back so
 * the caller can tell it why it is being closed.
 *
 * # Delivery
 *
 * All delivery is `try_send` on a bounded queue: a full or closed queue drops
 * the event for that connection and the caller keeps going. Nothing here
 * awaits while holding the lock.
 */

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

use crate::shared::event::ServerMessage;
use crate::shared::user::UserProfile;

/// Outbound queue capacity per connection
pub const CONNECTION_QUEUE_CAPACITY: usize = 64;

pub type EventSender = mpsc::Sender<ServerMessage>;
pub type EventReceiver = mpsc::Receiver<ServerMessage>;

/// Create the bounded outbound queue for one connection
pub fn connection_channel() -> (EventSender, EventReceiver) {
    mpsc::channel(CONNECTION_QUEUE_CAPACITY)
}

struct Connection {
    connection_id: Uuid,
    user: UserProfile,
    sender: EventSender,
    rooms: HashSet<String>,
    connected_at: DateTime<Utc>,
}

/// Snapshot of a live connection, as reported by `/api/socket-status`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedUser {
    pub user_id: i64,
    pub connection_id: Uuid,
    pub user: UserProfile,
    pub rooms: Vec<String>,
    pub connected_at: DateTime<Utc>,
}

/// A connection that was replaced by a newer one from the same user
pub struct SupersededConnection {
    pub connection_id: Uuid,
    sender: EventSender,
}

impl SupersededConnection {
    /// Send a last frame, then drop the sender so the old socket closes
    pub fn notify_and_close(self, message: ServerMessage) {
        if let Err(e) = self.sender.try_send(message) {
            tracing::debug!(
                "[Realtime] Could not notify superseded connection {}: {}",
                self.connection_id,
                e
            );
        }
    }
}

pub struct Registration {
    pub connection_id: Uuid,
    pub superseded: Option<SupersededConnection>,
}

/// Per-call delivery outcome
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub delivered: usize,
    pub dropped: usize,
}

impl Delivery {
    fn record(&mut self, connection: &Connection, event: &ServerMessage) {
        match connection.sender.try_send(event.clone()) {
            Ok(()) => self.delivered += 1,
            Err(TrySendError::Full(_)) => {
                self.dropped += 1;
                tracing::warn!(
                    "[Realtime] Queue full, dropped {} for user {}",
                    event.name(),
                    connection.user.id
                );
            }
            Err(TrySendError::Closed(_)) => {
                self.dropped += 1;
                tracing::debug!(
                    "[Realtime] Connection closing, dropped {} for user {}",
                    event.name(),
                    connection.user.id
                );
            }
        }
    }
}

#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    connections: Arc<Mutex<HashMap<i64, Connection>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<i64, Connection>> {
        self.connections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Store a new connection for `user`, replacing any existing one
    pub fn register(&self, user: UserProfile, sender: EventSender) -> Registration {
        let connection_id = Uuid::new_v4();
        let user_id = user.id;
        let connection = Connection {
            connection_id,
            user,
            sender,
            rooms: HashSet::new(),
            connected_at: Utc::now(),
        };

        let previous = self.lock().insert(user_id, connection);

        let superseded = previous.map(|old| {
            tracing::info!(
                "[Realtime] User {} reconnected, superseding connection {}",
                user_id,
                old.connection_id
            );
            SupersededConnection {
                connection_id: old.connection_id,
                sender: old.sender,
            }
        });

        Registration {
            connection_id,
            superseded,
        }
    }

    /// Remove the entry for `user_id` if it still belongs to `connection_id`
    pub fn unregister(&self, user_id: i64, connection_id: Uuid) -> bool {
        let mut connections = self.lock();
        match connections.get(&user_id) {
            Some(current) if current.connection_id == connection_id => {
                connections.remove(&user_id);
                true
            }
            _ => false,
        }
    }

    /// Replace the stored profile of `profile.id`'s live connection.
    ///
    /// Role filters such as `send_where(UserProfile::is_admin, ..)` read this
    /// profile, so it must follow every change to the stored account.
    pub fn update_profile(&self, profile: UserProfile) -> bool {
        match self.lock().get_mut(&profile.id) {
            Some(connection) => {
                connection.user = profile;
                true
            }
            None => false,
        }
    }

    /// Drop whatever connection `user_id` has (used when the account is deleted)
    pub fn evict(&self, user_id: i64) -> bool {
        self.lock().remove(&user_id).is_some()
    }

    pub fn join_room(&self, user_id: i64, connection_id: Uuid, room: impl Into<String>) -> bool {
        match self.lock().get_mut(&user_id) {
            Some(connection) if connection.connection_id == connection_id => {
                connection.rooms.insert(room.into());
                true
            }
            _ => false,
        }
    }

    pub fn leave_room(&self, user_id: i64, connection_id: Uuid, room: &str) -> bool {
        match self.lock().get_mut(&user_id) {
            Some(connection) if connection.connection_id == connection_id => {
                connection.rooms.remove(room)
            }
            _ => false,
        }
    }

    pub fn connection_count(&self) -> usize {
        self.lock().len()
    }

    pub fn is_connected(&self, user_id: i64) -> bool {
        self.lock().contains_key(&user_id)
    }

    /// Snapshot of every live connection, ordered by user id
    pub fn connected_users(&self) -> Vec<ConnectedUser> {
        let mut users: Vec<ConnectedUser> = self
            .lock()
            .iter()
            .map(|(user_id, connection)| {
                let mut rooms: Vec<String> = connection.rooms.iter().cloned().collect();
                rooms.sort();
                ConnectedUser {
                    user_id: *user_id,
                    connection_id: connection.connection_id,
                    user: connection.user.clone(),
                    rooms,
                    connected_at: connection.connected_at,
                }
            })
            .collect();
        users.sort_by_key(|u| u.user_id);
        users
    }

    /// Deliver to every connection
    pub fn broadcast(&self, event: &ServerMessage) -> Delivery {
        self.send_where(|_| true, event)
    }

    /// Deliver to the connections whose user matches `predicate`
    pub fn send_where<P>(&self, predicate: P, event: &ServerMessage) -> Delivery
    where
        P: Fn(&UserProfile) -> bool,
    {
        let mut delivery = Delivery::default();
        for connection in self.lock().values() {
            if predicate(&connection.user) {
                delivery.record(connection, event);
            }
        }
        delivery
    }

    pub fn send_to_user(&self, user_id: i64, event: &ServerMessage) -> Delivery {
        let mut delivery = Delivery::default();
        if let Some(connection) = self.lock().get(&user_id) {
            delivery.record(connection, event);
        }
        delivery
    }

    pub fn send_to_room(&self, room: &str, event: &ServerMessage) -> Delivery {
        let mut delivery = Delivery::default();
        for connection in self.lock().values() {
            if connection.rooms.contains(room) {
                delivery.record(connection, event);
            }
        }
        delivery
    }
}
