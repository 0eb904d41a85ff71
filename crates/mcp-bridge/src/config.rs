//! Declarative configuration types for servers and connections.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ids::{ConnectionId, ServerId};

/// The transport a server natively speaks, or a client connects with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Child process standard streams.
    Stdio,
    /// SSE stream plus companion POST endpoint.
    Sse,
    /// In-process paired channels.
    Memory,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Sse => write!(f, "sse"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Listen options for a server that natively speaks sse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SseOptions {
    /// Host interface to listen on.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

/// Restart policy governing the Supervisor's crash-loop behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecyclePolicy {
    /// Whether a crashing server should be automatically restarted.
    #[serde(default)]
    pub auto_restart: bool,
    /// Cap on crash-driven restarts; `None` means unbounded.
    #[serde(default)]
    pub max_restarts: Option<u32>,
    /// Delay before each crash-driven restart attempt.
    #[serde(default = "default_restart_delay")]
    pub restart_delay: Duration,
}

fn default_restart_delay() -> Duration {
    Duration::from_secs(1)
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self {
            auto_restart: false,
            max_restarts: None,
            restart_delay: default_restart_delay(),
        }
    }
}

/// Declared identity, launch parameters and policy for one server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Opaque, registry-unique id.
    pub id: ServerId,
    /// Human-readable name.
    pub name: String,
    /// Server version string.
    pub version: String,
    /// Executable path.
    pub command: String,
    /// Command-line arguments.
    #[serde(default)]
    pub args: Vec<String>,
    /// Working directory for the spawned process.
    #[serde(default)]
    pub working_dir: Option<String>,
    /// Environment variables passed to the spawned process.
    #[serde(default)]
    pub env: HashMap<String, String>,
    /// The server's native transport. Immutable after creation.
    pub transport: TransportKind,
    /// Required when `transport == Sse`.
    #[serde(default)]
    pub sse_options: Option<SseOptions>,
    /// Restart policy.
    #[serde(default)]
    pub lifecycle: LifecyclePolicy,
}

impl ServerConfig {
    /// Validate the invariants a registry can't check on its own
    /// (uniqueness is the registry's job).
    pub fn validate(&self) -> Result<(), String> {
        if self.transport == TransportKind::Sse && self.sse_options.is_none() {
            return Err("sse_options is required when transport = sse".to_string());
        }
        if self.transport == TransportKind::Stdio && self.command.is_empty() {
            return Err("command must not be empty when transport = stdio".to_string());
        }
        Ok(())
    }
}

/// Reconnect policy for a client connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectPolicy {
    /// Whether the connection should reconnect after disconnect.
    #[serde(default)]
    pub reconnect: bool,
    /// Cap on reconnect attempts; `None` means unbounded.
    #[serde(default)]
    pub max_reconnects: Option<u32>,
    /// Delay before each reconnect attempt.
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay: Duration,
}

fn default_reconnect_delay() -> Duration {
    Duration::from_secs(1)
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            reconnect: false,
            max_reconnects: None,
            reconnect_delay: default_reconnect_delay(),
        }
    }
}

/// Declared identity and target for one client connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Opaque, registry-unique id. Assigned by the registry if absent.
    #[serde(default)]
    pub id: Option<ConnectionId>,
    /// The server this connection bridges to.
    pub server_id: ServerId,
    /// The transport the client side speaks.
    pub client_transport: TransportKind,
    /// Optional cap on how long `connect()` may take.
    #[serde(default)]
    pub connect_timeout: Option<Duration>,
    /// Reconnect policy.
    #[serde(default)]
    pub reconnect: ReconnectPolicy,
}

/// Out-of-band values a caller supplies to `connect()` that aren't part
/// of the declarative `ConnectionConfig`: an environment delta to
/// apply to the target server before connecting.
///
/// An sse "responseSink" hint (an open SSE HTTP response) isn't
/// represented here: an sse-transport client is served by
/// `transport::sse::SseServerAdapter`, which owns its own broadcast
/// channel. The admin HTTP layer subscribes to that channel when the
/// downstream client's GET request arrives and feeds it posted frames
/// directly — the core crate never holds an axum response type.
#[derive(Debug, Clone, Default)]
pub struct ConnectHints {
    /// Environment delta to merge into the target server before connecting.
    pub env_delta: Option<HashMap<String, String>>,
}
