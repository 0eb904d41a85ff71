//! Error types for the bridge core.
//!
//! One `thiserror` enum, one variant per domain error kind, each
//! carrying the id it refers to and an optional underlying cause.

use thiserror::Error;

use crate::ids::{ConnectionId, ServerId};

/// Result type for bridge operations.
pub type BridgeResult<T> = std::result::Result<T, BridgeError>;

/// Domain error kinds surfaced on the public API.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BridgeError {
    /// Request shape/type mismatch.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Server or connection id unknown.
    #[error("not found: {kind} {id}")]
    NotFound { kind: &'static str, id: String },

    /// Id collision on register/create.
    #[error("already exists: {kind} {id}")]
    AlreadyExists { kind: &'static str, id: String },

    /// Operation not allowed in the current status.
    #[error("invalid state: {kind} {id} is {status}, cannot {op}")]
    InvalidState {
        kind: &'static str,
        id: String,
        status: String,
        op: String,
    },

    /// Server failed to start.
    #[error("server {id} failed to start: {message}")]
    ServerStartFailed {
        id: ServerId,
        message: String,
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Server failed to stop cleanly.
    #[error("server {id} failed to stop: {message}")]
    ServerStopFailed {
        id: ServerId,
        message: String,
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Connect/disconnect failure.
    #[error("connection {id} failed: {message}")]
    ConnectionFailed {
        id: String,
        message: String,
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Low-level adapter I/O failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Transport combination not implemented.
    #[error("unsupported transport combination: {0}")]
    UnsupportedTransport(String),
}

impl BridgeError {
    /// Stable machine-readable code for the admin JSON envelope.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "ValidationError",
            Self::NotFound { .. } => "NotFound",
            Self::AlreadyExists { .. } => "AlreadyExists",
            Self::InvalidState { .. } => "InvalidState",
            Self::ServerStartFailed { .. } => "ServerStartFailed",
            Self::ServerStopFailed { .. } => "ServerStopFailed",
            Self::ConnectionFailed { .. } => "ConnectionFailed",
            Self::Transport(_) => "TransportError",
            Self::UnsupportedTransport(_) => "UnsupportedTransport",
        }
    }

    /// HTTP status category for the admin surface.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::AlreadyExists { .. } | Self::InvalidState { .. } => 409,
            Self::ServerStartFailed { .. }
            | Self::ServerStopFailed { .. }
            | Self::ConnectionFailed { .. }
            | Self::Transport(_)
            | Self::UnsupportedTransport(_) => 500,
        }
    }

    pub(crate) fn server_not_found(id: &ServerId) -> Self {
        Self::NotFound {
            kind: "server",
            id: id.to_string(),
        }
    }

    pub(crate) fn connection_not_found(id: &ConnectionId) -> Self {
        Self::NotFound {
            kind: "connection",
            id: id.to_string(),
        }
    }

    pub(crate) fn server_exists(id: &ServerId) -> Self {
        Self::AlreadyExists {
            kind: "server",
            id: id.to_string(),
        }
    }

    pub(crate) fn connection_exists(id: &ConnectionId) -> Self {
        Self::AlreadyExists {
            kind: "connection",
            id: id.to_string(),
        }
    }

    pub(crate) fn invalid_server_state(id: &ServerId, status: impl ToString, op: &str) -> Self {
        Self::InvalidState {
            kind: "server",
            id: id.to_string(),
            status: status.to_string(),
            op: op.to_string(),
        }
    }

    pub(crate) fn invalid_connection_state(
        id: &ConnectionId,
        status: impl ToString,
        op: &str,
    ) -> Self {
        Self::InvalidState {
            kind: "connection",
            id: id.to_string(),
            status: status.to_string(),
            op: op.to_string(),
        }
    }
}
