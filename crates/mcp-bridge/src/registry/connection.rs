//! Connection Registry: a pure in-memory catalog of client connections
//! and their runtime state, keyed by connection id.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::config::ConnectionConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::ids::ConnectionId;

/// Runtime status of a client connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnecting,
    Disconnected,
    Error,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
            Self::Disconnecting => "Disconnecting",
            Self::Disconnected => "Disconnected",
            Self::Error => "Error",
        };
        write!(f, "{label}")
    }
}

/// Read-only projection of a connection's state. The live Handler and
/// client-side adapter are owned by the Bridge Manager, not here; this
/// tracks presence only (invariant: `Connected ⇔ a Handler exists`).
#[derive(Debug, Clone)]
pub struct ConnectionSnapshot {
    pub config: ConnectionConfig,
    pub status: ConnectionStatus,
    pub has_transport: bool,
    pub last_error: Option<String>,
    pub connect_time: Option<DateTime<Utc>>,
    pub reconnect_count: u32,
}

struct ConnectionRecord {
    config: ConnectionConfig,
    status: ConnectionStatus,
    has_transport: bool,
    last_error: Option<String>,
    connect_time: Option<DateTime<Utc>>,
    reconnect_count: u32,
}

impl ConnectionRecord {
    fn snapshot(&self) -> ConnectionSnapshot {
        ConnectionSnapshot {
            config: self.config.clone(),
            status: self.status,
            has_transport: self.has_transport,
            last_error: self.last_error.clone(),
            connect_time: self.connect_time,
            reconnect_count: self.reconnect_count,
        }
    }
}

/// Pure in-memory catalog of connections keyed by id.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, ConnectionRecord>,
    /// Registration order, for `list()` — a catalog, not a hash-ordered dump.
    insertion_order: std::sync::Mutex<Vec<ConnectionId>>,
}

impl ConnectionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a new connection in `Disconnected`. Assigns an id if the
    /// config doesn't name one.
    pub fn create(&self, mut config: ConnectionConfig) -> BridgeResult<ConnectionSnapshot> {
        let id = config.id.clone().unwrap_or_else(ConnectionId::generate);
        if self.connections.contains_key(&id) {
            return Err(BridgeError::connection_exists(&id));
        }
        config.id = Some(id.clone());
        let record = ConnectionRecord {
            config,
            status: ConnectionStatus::Disconnected,
            has_transport: false,
            last_error: None,
            connect_time: None,
            reconnect_count: 0,
        };
        let snapshot = record.snapshot();
        self.insertion_order.lock().unwrap().push(id.clone());
        self.connections.insert(id, record);
        Ok(snapshot)
    }

    /// Remove a connection. Requires `Disconnected`.
    pub fn remove(&self, id: &ConnectionId) -> BridgeResult<()> {
        {
            let record = self
                .connections
                .get(id)
                .ok_or_else(|| BridgeError::connection_not_found(id))?;
            if record.status != ConnectionStatus::Disconnected {
                return Err(BridgeError::invalid_connection_state(id, record.status, "remove"));
            }
        }
        self.connections.remove(id);
        self.insertion_order.lock().unwrap().retain(|existing| existing != id);
        Ok(())
    }

    /// Remove a connection regardless of status. Used only by the
    /// Bridge Manager to unwind a `connect()` that failed partway
    /// through, so a failed connect leaves no residue.
    pub(crate) fn force_remove(&self, id: &ConnectionId) {
        self.connections.remove(id);
        self.insertion_order.lock().unwrap().retain(|existing| existing != id);
    }

    pub fn get(&self, id: &ConnectionId) -> BridgeResult<ConnectionSnapshot> {
        self.connections
            .get(id)
            .map(|r| r.snapshot())
            .ok_or_else(|| BridgeError::connection_not_found(id))
    }

    /// Registration order.
    #[must_use]
    pub fn list(&self) -> Vec<ConnectionSnapshot> {
        self.insertion_order
            .lock()
            .unwrap()
            .iter()
            .filter_map(|id| self.connections.get(id).map(|r| r.snapshot()))
            .collect()
    }

    /// All connections currently `Connected` against `server_id`,
    /// snapshotted for the hot-swap path.
    #[must_use]
    pub fn connected_to_server(&self, server_id: &crate::ids::ServerId) -> Vec<ConnectionSnapshot> {
        self.connections
            .iter()
            .filter(|e| e.value().status == ConnectionStatus::Connected && &e.value().config.server_id == server_id)
            .map(|e| e.value().snapshot())
            .collect()
    }

    pub fn update_status(
        &self,
        id: &ConnectionId,
        status: ConnectionStatus,
        error: Option<String>,
    ) -> BridgeResult<()> {
        let mut record = self
            .connections
            .get_mut(id)
            .ok_or_else(|| BridgeError::connection_not_found(id))?;
        record.status = status;
        record.last_error = error;
        if status == ConnectionStatus::Connected {
            record.connect_time = Some(Utc::now());
        }
        Ok(())
    }

    pub fn set_transport_present(&self, id: &ConnectionId, present: bool) -> BridgeResult<()> {
        let mut record = self
            .connections
            .get_mut(id)
            .ok_or_else(|| BridgeError::connection_not_found(id))?;
        record.has_transport = present;
        Ok(())
    }

    pub fn reset_reconnect_count(&self, id: &ConnectionId) -> BridgeResult<()> {
        let mut record = self
            .connections
            .get_mut(id)
            .ok_or_else(|| BridgeError::connection_not_found(id))?;
        record.reconnect_count = 0;
        Ok(())
    }
}
