/**
 * Local Task Board
 *
 * A client-side copy of the task list, newest first, kept current by the
 * `task_created` / `task_updated` / `task_deleted` socket events.
 *
 * Per task id the most recent `updated_at` wins, so replays and the admin
 * duplicate of an event are harmless. Deleted ids are remembered and later
 * updates for them are dropped.
 */
use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;

use crate::client::error::ClientError;
use crate::shared::event::{ServerMessage, TaskEventKind, TaskEventPayload};
use crate::shared::task::Task;

#[derive(Debug, Clone, Default)]
pub struct TaskBoard {
    tasks: Vec<Task>,
    deleted: HashSet<i64>,
}

impl TaskBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the board from `GET /api/tasks`.
    pub fn replace_all(&mut self, mut tasks: Vec<Task>) {
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        self.tasks = tasks;
        self.deleted.clear();
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Apply a server frame. Returns whether the board changed.
    pub fn apply(&mut self, message: &ServerMessage) -> bool {
        match message {
            ServerMessage::TaskCreated(p)
            | ServerMessage::TaskUpdated(p)
            | ServerMessage::TaskDeleted(p) => self.apply_change(p.kind, &p.task),
            ServerMessage::TaskCreatedAdmin(p)
            | ServerMessage::TaskUpdatedAdmin(p)
            | ServerMessage::TaskDeletedAdmin(p) => self.apply_change(p.kind, &p.task),
            _ => false,
        }
    }

    /// Apply an untyped `{event, data}` pair as delivered by the dispatcher.
    /// Non-task events are ignored.
    pub fn apply_envelope(&mut self, event: &str, data: &Value) -> Result<bool, ClientError> {
        let Some(kind) = TaskEventKind::from_event_name(event) else {
            return Ok(false);
        };
        let payload = TaskEventPayload::deserialize(data)?;
        Ok(self.apply_change(kind, &payload.task))
    }

    pub fn apply_change(&mut self, kind: TaskEventKind, task: &Task) -> bool {
        match kind {
            TaskEventKind::Created => self.upsert(task, true),
            TaskEventKind::Updated => self.upsert(task, false),
            TaskEventKind::Deleted => {
                self.deleted.insert(task.id);
                let before = self.tasks.len();
                self.tasks.retain(|t| t.id != task.id);
                self.tasks.len() != before
            }
        }
    }

    fn upsert(&mut self, task: &Task, at_front: bool) -> bool {
        if self.deleted.contains(&task.id) {
            return false;
        }
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => {
                if existing.updated_at > task.updated_at || existing == task {
                    return false;
                }
                *existing = task.clone();
                true
            }
            None => {
                if at_front {
                    self.tasks.insert(0, task.clone());
                } else {
                    let at = self
                        .tasks
                        .iter()
                        .position(|t| (t.created_at, t.id) < (task.created_at, task.id))
                        .unwrap_or(self.tasks.len());
                    self.tasks.insert(at, task.clone());
                }
                true
            }
        }
    }
}
