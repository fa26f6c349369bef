//! User management routes (`/api/users`). The user store itself lives in
//! `backend::auth::users`.

pub mod handlers;

pub use handlers::{create_user, delete_user, get_user, list_user_tasks, list_users, update_user};
