//! Tasks Module
//!
//! - **`db`** - task store (SQL, ownership filters)
//! - **`handlers`** - `/api/tasks` REST handlers, which publish task events

pub mod db;
pub mod handlers;

pub use handlers::{create_task, delete_task, get_task, list_tasks, update_task};
