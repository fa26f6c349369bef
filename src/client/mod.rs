//! Client Module
//!
//! Everything a TaskHub front end needs to talk to the server, without any
//! UI: a REST client, a socket bridge that turns frames into named events,
//! and a `TaskBoard` that keeps a local task list current.
//!
//! ```rust,no_run
//! use taskhub::client::{ApiClient, ClientConfig, EventBridge, TaskBoard};
//! use std::sync::{Arc, Mutex};
//!
//! # async fn example() -> Result<(), taskhub::client::ClientError> {
//! let mut api = ApiClient::new(ClientConfig::from_env()?);
//! let auth = api.login("alice@example.com", "secret1").await?;
//!
//! let board = Arc::new(Mutex::new(TaskBoard::new()));
//! board.lock().unwrap().replace_all(api.list_tasks().await?);
//!
//! let mut bridge = EventBridge::new(api.config());
//! for event in ["task_created", "task_updated", "task_deleted"] {
//!     let board = Arc::clone(&board);
//!     bridge.on(event, move |data| {
//!         let _ = board.lock().unwrap().apply_envelope(event, data);
//!     });
//! }
//! bridge.connect(&auth.token).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod board;
pub mod bridge;
pub mod config;
pub mod dispatch;
pub mod error;

pub use api::ApiClient;
pub use board::TaskBoard;
pub use bridge::EventBridge;
pub use config::ClientConfig;
pub use dispatch::{EventDispatcher, SubscriptionId};
pub use error::ClientError;
