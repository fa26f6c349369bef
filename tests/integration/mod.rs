//! Integration tests
//!
//! - `api` drives the router in-process with `tower::ServiceExt::oneshot`
//! - `realtime` serves the app on a real port and connects `EventBridge`s

pub mod realtime;
