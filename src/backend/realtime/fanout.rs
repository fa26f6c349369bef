/**
 * Task Event Fanout
 *
 * Turns a committed task mutation into socket events:
 *
 * - `task_<kind>` with `{ task, actorName, kind }` to every connection
 * - `task_<kind>_admin` with the actor's id and email plus the live
 *   connection count, to connections whose user holds the admin role
 *
 * Delivery is fire-and-forget. `publish` never fails; the report it returns
 * is only for logging and tests.
 */

use crate::backend::realtime::registry::ConnectionRegistry;
use crate::shared::event::{AdminTaskEventPayload, ServerMessage, TaskEventKind, TaskEventPayload};
use crate::shared::task::Task;
use crate::shared::user::UserProfile;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FanoutReport {
    /// Connections that accepted the broadcast event
    pub delivered: usize,
    /// Admin connections that accepted the admin event
    pub admin_delivered: usize,
    /// Events dropped on full or closed queues, both families
    pub dropped: usize,
}

#[derive(Clone)]
pub struct EventFanout {
    registry: ConnectionRegistry,
}

impl EventFanout {
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self { registry }
    }

    pub fn publish(&self, kind: TaskEventKind, task: &Task, actor: &UserProfile) -> FanoutReport {
        let broadcast = ServerMessage::task_event(TaskEventPayload {
            task: task.clone(),
            actor_name: actor.name.clone(),
            kind,
        });
        let everyone = self.registry.broadcast(&broadcast);

        let admin = ServerMessage::admin_task_event(AdminTaskEventPayload {
            task: task.clone(),
            actor_name: actor.name.clone(),
            kind,
            actor_id: actor.id,
            actor_email: actor.email.clone(),
            connection_count: self.registry.connection_count(),
        });
        let admins = self.registry.send_where(UserProfile::is_admin, &admin);

        let report = FanoutReport {
            delivered: everyone.delivered,
            admin_delivered: admins.delivered,
            dropped: everyone.dropped + admins.dropped,
        };

        tracing::info!(
            "[Realtime] {} for task {} by user {} delivered to {} connections ({} admin, {} dropped)",
            kind.event_name(),
            task.id,
            actor.id,
            report.delivered,
            report.admin_delivered,
            report.dropped
        );

        report
    }
}
