/**
 * Real-time Event System
 *
 * Every frame on the `/socket` channel is a JSON text message of the form
 * `{ "event": <name>, "data": <payload> }`. `ServerMessage` enumerates what
 * the server pushes, `ClientMessage` what a client may send back.
 *
 * Task mutations produce two event families:
 * - `task_created` / `task_updated` / `task_deleted`, broadcast to everyone
 * - `task_<kind>_admin`, delivered only to administrators, with actor details
 */
use serde::{Deserialize, Serialize};

use crate::shared::task::Task;
use crate::shared::user::UserProfile;

/// What happened to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskEventKind {
    Created,
    Updated,
    Deleted,
}

impl TaskEventKind {
    pub const ALL: [TaskEventKind; 3] = [Self::Created, Self::Updated, Self::Deleted];

    /// Event name of the broadcast family.
    pub fn event_name(self) -> &'static str {
        match self {
            Self::Created => "task_created",
            Self::Updated => "task_updated",
            Self::Deleted => "task_deleted",
        }
    }

    /// Event name of the administrator family.
    pub fn admin_event_name(self) -> &'static str {
        match self {
            Self::Created => "task_created_admin",
            Self::Updated => "task_updated_admin",
            Self::Deleted => "task_deleted_admin",
        }
    }

    pub fn from_event_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.event_name() == name)
    }
}

/// Payload of the broadcast task events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEventPayload {
    /// The task as it is after the mutation (as it was, for deletes)
    pub task: Task,
    /// Display name of the user who performed the mutation
    pub actor_name: String,
    pub kind: TaskEventKind,
}

/// Payload of the administrator task events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminTaskEventPayload {
    pub task: Task,
    pub actor_name: String,
    pub kind: TaskEventKind,
    pub actor_id: i64,
    pub actor_email: String,
    /// Number of live connections when the event was produced
    pub connection_count: usize,
}

/// Server → client frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// First frame on every admitted connection
    Connected { message: String, user: UserProfile },
    TaskCreated(TaskEventPayload),
    TaskUpdated(TaskEventPayload),
    TaskDeleted(TaskEventPayload),
    TaskCreatedAdmin(AdminTaskEventPayload),
    TaskUpdatedAdmin(AdminTaskEventPayload),
    TaskDeletedAdmin(AdminTaskEventPayload),
    Pong { timestamp: String },
    RoomJoined { room: String },
    RoomLeft { room: String },
    /// A newer connection from the same user took over; this one is closing
    SessionSuperseded { message: String },
    /// Sent to the user's own room after an administrator changed the account
    AccountUpdated { user: UserProfile },
    /// The account was deleted; the connection closes right after
    AccountDeleted { message: String },
    Error { message: String },
}

impl ServerMessage {
    pub fn task_event(payload: TaskEventPayload) -> Self {
        match payload.kind {
            TaskEventKind::Created => Self::TaskCreated(payload),
            TaskEventKind::Updated => Self::TaskUpdated(payload),
            TaskEventKind::Deleted => Self::TaskDeleted(payload),
        }
    }

    pub fn admin_task_event(payload: AdminTaskEventPayload) -> Self {
        match payload.kind {
            TaskEventKind::Created => Self::TaskCreatedAdmin(payload),
            TaskEventKind::Updated => Self::TaskUpdatedAdmin(payload),
            TaskEventKind::Deleted => Self::TaskDeletedAdmin(payload),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Wire name of this frame (the `event` field).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::TaskCreated(p) | Self::TaskUpdated(p) | Self::TaskDeleted(p) => {
                p.kind.event_name()
            }
            Self::TaskCreatedAdmin(p) | Self::TaskUpdatedAdmin(p) | Self::TaskDeletedAdmin(p) => {
                p.kind.admin_event_name()
            }
            Self::Pong { .. } => "pong",
            Self::RoomJoined { .. } => "room_joined",
            Self::RoomLeft { .. } => "room_left",
            Self::SessionSuperseded { .. } => "session_superseded",
            Self::AccountUpdated { .. } => "account_updated",
            Self::AccountDeleted { .. } => "account_deleted",
            Self::Error { .. } => "error",
        }
    }
}

/// Client → server frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    JoinRoom(String),
    LeaveRoom(String),
    Ping,
}

/// Untyped view of any frame, used by the client dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Name of the per-user room every connection joins on admission.
pub fn personal_room(user_id: i64) -> String {
    format!("user_{user_id}")
}
