//! Real-time Update Module
//!
//! Pushes task mutations to every connected client over WebSocket.
//!
//! # Architecture
//!
//! - **`registry`** - live connections, one per user, with bounded outbound queues
//! - **`fanout`** - task mutation → `task_<kind>` / `task_<kind>_admin` events
//! - **`socket`** - `/socket` handshake and the per-connection loop
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs          - Module exports and documentation
//! ├── registry.rs     - ConnectionRegistry
//! ├── fanout.rs       - EventFanout
//! └── socket.rs       - WebSocket handler
//! ```
//!
//! # Delivery Semantics
//!
//! At-most-once, best effort. An event is enqueued with `try_send`; a slow
//! client whose queue is full loses that event rather than slowing the
//! request that produced it. There is no replay on reconnect.
//!
//! # Example
//!
//! ```rust
//! use taskhub::backend::realtime::{ConnectionRegistry, EventFanout};
//!
//! let registry = ConnectionRegistry::new();
//! let fanout = EventFanout::new(registry.clone());
//! assert_eq!(registry.connection_count(), 0);
//! # let _ = fanout;
//! ```

/// Connection registry
pub mod registry;

/// Task event fanout
pub mod fanout;

/// WebSocket endpoint
pub mod socket;

// Re-export commonly used types and functions
pub use fanout::{EventFanout, FanoutReport};
pub use registry::{ConnectedUser, ConnectionRegistry, Delivery};
pub use socket::socket_handler;
