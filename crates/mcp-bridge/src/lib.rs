//! Transport-bridging proxy for the Model Context Protocol.
//!
//! `mcp-bridge` lets a client speaking one MCP transport (stdio, sse,
//! memory) talk to a server speaking a different one, while letting an
//! administrator mutate a running server's environment and hot-swap it
//! beneath live client connections without losing them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Admin Surface (admin::http)                              │
//! │ thin axum veneer: validates requests, calls one Bridge   │
//! │ Manager operation, serializes the result                 │
//! └─────────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │ Bridge Manager (manager)                                  │
//! │ connect / disconnect / updateEnvironment hot-swap         │
//! └───────────────┬─────────────────────────┬─────────────────┘
//!                 ▼                         ▼
//! ┌───────────────────────────┐ ┌───────────────────────────┐
//! │ Server Supervisor          │ │ Registries (registry)      │
//! │ spawn/stop/restart + crash │ │ Server + Connection catalog │
//! │ loop (supervisor)          │ │                             │
//! └───────────────┬───────────┘ └─────────────────────────────┘
//!                 ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │ Transport Adapter + Handler (transport, handler)           │
//! │ stdio / sse / memory, frame forwarding both directions     │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The bridge is schema-agnostic: frames are opaque `serde_json::Value`
//! JSON-RPC objects, routed verbatim with no transformation or
//! authorization layered on top.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod admin;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handler;
pub mod ids;
pub mod manager;
pub mod registry;
pub mod supervisor;
pub mod transport;

pub use bootstrap::BridgeConfig;
pub use config::{
    ConnectHints, ConnectionConfig, LifecyclePolicy, ReconnectPolicy, ServerConfig, SseOptions,
    TransportKind,
};
pub use error::{BridgeError, BridgeResult};
pub use handler::Handler;
pub use ids::{ConnectionId, ServerId};
pub use manager::BridgeManager;
pub use registry::{ConnectionRegistry, ConnectionStatus, ServerRegistry, ServerStatus};
pub use supervisor::Supervisor;

use std::sync::Arc;

/// The fully wired runtime: one pair of registries, one supervisor, one
/// manager, sharing the `Arc`s the way the admin surface and any
/// embedder need. Construct once per process — state is process-local
/// and lost on restart.
pub struct Bridge {
    /// Bridge Manager, the entry point for every public operation.
    pub manager: Arc<BridgeManager>,
}

impl Bridge {
    /// Build a fresh, empty bridge runtime: no servers, no connections.
    #[must_use]
    pub fn new() -> Self {
        let servers = Arc::new(ServerRegistry::new());
        let connections = Arc::new(ConnectionRegistry::new());
        let supervisor = Supervisor::new(Arc::clone(&servers));
        let manager = BridgeManager::new(servers, connections, supervisor);
        Self { manager }
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}

/// Version of the `mcp-bridge` crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
