//! JSON projections of internal state for the admin HTTP surface:
//! success responses carry an object shaped after the declared config
//! plus runtime status, omitting process/transport handles and
//! exposing only presence flags.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{ConnectionConfig, LifecyclePolicy, ReconnectPolicy, ServerConfig, SseOptions, TransportKind};
use crate::ids::{ConnectionId, ServerId};
use crate::registry::{ConnectionSnapshot, ConnectionStatus, ServerSnapshot, ServerStatus};

/// `GET /api/servers`, `GET /api/servers/{id}` projection.
#[derive(Debug, Clone, Serialize)]
pub struct ServerView {
    pub id: ServerId,
    pub name: String,
    pub version: String,
    pub command: String,
    pub args: Vec<String>,
    pub working_dir: Option<String>,
    pub env: HashMap<String, String>,
    pub transport: TransportKind,
    pub sse_options: Option<SseOptions>,
    pub lifecycle: LifecyclePolicy,
    pub status: ServerStatus,
    pub has_process: bool,
    pub has_transport: bool,
    pub start_time: Option<DateTime<Utc>>,
    pub restart_count: u32,
    pub error: Option<String>,
}

impl From<ServerSnapshot> for ServerView {
    fn from(s: ServerSnapshot) -> Self {
        Self {
            id: s.config.id,
            name: s.config.name,
            version: s.config.version,
            command: s.config.command,
            args: s.config.args,
            working_dir: s.config.working_dir,
            env: s.config.env,
            transport: s.config.transport,
            sse_options: s.config.sse_options,
            lifecycle: s.config.lifecycle,
            status: s.status,
            has_process: s.has_process,
            has_transport: s.has_transport,
            start_time: s.start_time,
            restart_count: s.restart_count,
            error: s.last_error,
        }
    }
}

/// `POST /api/servers` request body: a `ServerConfig` without `id`
/// (the registry assigns one).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateServerRequest {
    pub name: String,
    pub version: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub working_dir: Option<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
    pub transport: TransportKind,
    #[serde(default)]
    pub sse_options: Option<SseOptions>,
    #[serde(default)]
    pub lifecycle: LifecyclePolicy,
}

impl CreateServerRequest {
    #[must_use]
    pub fn into_config(self, id: ServerId) -> ServerConfig {
        ServerConfig {
            id,
            name: self.name,
            version: self.version,
            command: self.command,
            args: self.args,
            working_dir: self.working_dir,
            env: self.env,
            transport: self.transport,
            sse_options: self.sse_options,
            lifecycle: self.lifecycle,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateServerResponse {
    pub id: ServerId,
}

/// `PUT /api/servers/{id}` partial update body. Every field optional;
/// only present fields are applied. Rejected (400) unless the target
/// is `Stopped`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateServerRequest {
    pub name: Option<String>,
    pub version: Option<String>,
    pub command: Option<String>,
    pub args: Option<Vec<String>>,
    pub working_dir: Option<String>,
    pub env: Option<HashMap<String, String>>,
    pub sse_options: Option<SseOptions>,
    pub lifecycle: Option<LifecyclePolicy>,
}

/// `POST /api/servers/{id}/environment` body: a flat `name -> string`
/// mapping. Any non-string element is rejected by serde with a 400
/// before the handler ever sees it.
pub type EnvironmentRequest = HashMap<String, String>;

/// `GET /api/connections`, `GET /api/connections/{id}` projection.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionView {
    pub id: ConnectionId,
    pub server_id: ServerId,
    pub client_transport: TransportKind,
    pub connect_timeout_ms: Option<u64>,
    pub reconnect: ReconnectPolicy,
    pub status: ConnectionStatus,
    pub has_transport: bool,
    pub connect_time: Option<DateTime<Utc>>,
    pub reconnect_count: u32,
    pub error: Option<String>,
}

impl From<ConnectionSnapshot> for ConnectionView {
    fn from(c: ConnectionSnapshot) -> Self {
        Self {
            id: c.config.id.unwrap_or_else(ConnectionId::generate),
            server_id: c.config.server_id,
            client_transport: c.config.client_transport,
            connect_timeout_ms: c.config.connect_timeout.map(|d| d.as_millis() as u64),
            reconnect: c.config.reconnect,
            status: c.status,
            has_transport: c.has_transport,
            connect_time: c.connect_time,
            reconnect_count: c.reconnect_count,
            error: c.last_error,
        }
    }
}

/// `POST /api/connections` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateConnectionRequest {
    #[serde(default)]
    pub id: Option<ConnectionId>,
    pub server_id: ServerId,
    pub client_transport: TransportKind,
    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,
    #[serde(default)]
    pub reconnect: ReconnectPolicy,
    /// Environment delta to apply to the target server before
    /// connecting — out-of-band, not part of the declarative
    /// `ConnectionConfig` itself.
    #[serde(default)]
    pub env_delta: Option<HashMap<String, String>>,
}

impl CreateConnectionRequest {
    #[must_use]
    pub fn into_config(self) -> ConnectionConfig {
        ConnectionConfig {
            id: self.id,
            server_id: self.server_id,
            client_transport: self.client_transport,
            connect_timeout: self.connect_timeout_ms.map(std::time::Duration::from_millis),
            reconnect: self.reconnect,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateConnectionResponse {
    pub id: ConnectionId,
}

/// `{error:{code, message}}` envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

impl From<&crate::error::BridgeError> for ErrorBody {
    fn from(e: &crate::error::BridgeError) -> Self {
        Self {
            error: ErrorDetail {
                code: e.code(),
                message: e.to_string(),
            },
        }
    }
}
