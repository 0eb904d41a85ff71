//! Bridge Manager: orchestrates the registries, the Supervisor, and
//! per-connection Handlers. This is the only module that knows how
//! `connect`, `disconnect`, and the environment-update hot-swap
//! compose — every other module is a narrower primitive.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{info, warn};

use crate::config::{ConnectHints, ConnectionConfig};
use crate::error::{BridgeError, BridgeResult};
use crate::handler::{ClosedBy, Handler};
use crate::ids::{ConnectionId, ServerId};
use crate::registry::{ConnectionRegistry, ConnectionSnapshot, ConnectionStatus, ServerRegistry, ServerSnapshot, ServerStatus};
use crate::supervisor::Supervisor;
use crate::transport::sse::SseServerAdapter;
use crate::transport::stdio::StdioClientAdapter;
use crate::transport::{self, DynAdapter, Frame};

/// Orchestrates Registries, Supervisor, and Handlers.
pub struct BridgeManager {
    servers: Arc<ServerRegistry>,
    connections: Arc<ConnectionRegistry>,
    supervisor: Arc<Supervisor>,
    handlers: DashMap<ConnectionId, Arc<Handler>>,
    /// sse-as-client-transport connections need their concrete adapter
    /// reachable by the admin HTTP layer's GET/POST routes; `DynAdapter`
    /// erases the type, so this side table keeps the concrete handle.
    sse_server_adapters: DashMap<ConnectionId, Arc<SseServerAdapter>>,
    /// The far half of a memory-transport client adapter, for an
    /// embedded in-process consumer (or a test) to drive directly.
    memory_client_peers: DashMap<ConnectionId, DynAdapter>,
}

impl BridgeManager {
    #[must_use]
    pub fn new(servers: Arc<ServerRegistry>, connections: Arc<ConnectionRegistry>, supervisor: Arc<Supervisor>) -> Arc<Self> {
        Arc::new(Self {
            servers,
            connections,
            supervisor,
            handlers: DashMap::new(),
            sse_server_adapters: DashMap::new(),
            memory_client_peers: DashMap::new(),
        })
    }

    /// The in-process counterpart of a memory-transport client adapter,
    /// for embedding a consumer directly in this process.
    #[must_use]
    pub fn memory_client_peer(&self, connection_id: &ConnectionId) -> Option<DynAdapter> {
        self.memory_client_peers.get(connection_id).map(|a| a.clone())
    }

    #[must_use]
    pub fn servers(&self) -> &ServerRegistry {
        &self.servers
    }

    #[must_use]
    pub fn connections(&self) -> &ConnectionRegistry {
        &self.connections
    }

    pub fn register_server(&self, config: crate::config::ServerConfig) -> BridgeResult<ServerSnapshot> {
        self.servers.register(config)
    }

    pub async fn unregister_server(&self, id: &ServerId) -> BridgeResult<()> {
        self.servers.unregister(id)
    }

    pub async fn start_server(self: &Arc<Self>, id: &ServerId) -> BridgeResult<ServerSnapshot> {
        self.supervisor.start(id).await?;
        self.servers.get(id)
    }

    pub async fn stop_server(&self, id: &ServerId) -> BridgeResult<ServerSnapshot> {
        self.disconnect_all_for_server(id).await;
        self.supervisor.stop(id).await?;
        self.servers.get(id)
    }

    /// The admin HTTP layer's companion route to `GET /api/servers/{id}/connections`.
    #[must_use]
    pub fn connections_for_server(&self, id: &ServerId) -> Vec<ConnectionSnapshot> {
        self.connections
            .list()
            .into_iter()
            .filter(|c| &c.config.server_id == id)
            .collect()
    }

    /// The admin HTTP layer's GET `/sse` route for a given connection.
    #[must_use]
    pub fn sse_subscribe(&self, connection_id: &ConnectionId) -> Option<tokio::sync::broadcast::Receiver<Frame>> {
        self.sse_server_adapters.get(connection_id).map(|a| a.subscribe())
    }

    /// The admin HTTP layer's companion POST route for an sse connection.
    pub fn handle_inbound_sse_post(&self, connection_id: &ConnectionId, body: Frame) -> BridgeResult<()> {
        let adapter = self
            .sse_server_adapters
            .get(connection_id)
            .ok_or_else(|| BridgeError::connection_not_found(connection_id))?;
        adapter.deliver_post(body);
        Ok(())
    }

    /// **connect**. Atomic: a failure at any step leaves no
    /// dangling handler and no half-initialized adapter.
    pub async fn connect(self: &Arc<Self>, config: ConnectionConfig, hints: ConnectHints) -> BridgeResult<ConnectionId> {
        let server_id = config.server_id.clone();
        let client_transport = config.client_transport;
        let connect_timeout = config.connect_timeout;

        let snapshot = self.connections.create(config)?;
        let connection_id = snapshot.config.id.clone().expect("create() always assigns an id");

        let outcome = async {
            if let Some(delta) = hints.env_delta {
                let restart_required = self.servers.merge_env(&server_id, delta)?;
                if restart_required {
                    self.hot_swap(&server_id).await?;
                }
            }

            let server_transport = self.servers.get(&server_id)?.config.transport;
            transport::validate_pairing(client_transport, server_transport)?;

            let server_status = self.servers.get(&server_id)?.status;
            if server_status != ServerStatus::Running {
                self.supervisor.start(&server_id).await?;
            }

            self.connections.update_status(&connection_id, ConnectionStatus::Connecting, None)?;

            let client_adapter = self.build_client_adapter(client_transport, &connection_id);
            let server_adapter = self.supervisor.server_adapter(&server_id)?;

            let handler = Handler::new(client_adapter, server_adapter);
            let this = Arc::clone(self);
            let closing_id = connection_id.clone();
            let start_result = match connect_timeout {
                Some(timeout) => tokio::time::timeout(
                    timeout,
                    handler.start(Arc::new(move |by| this.on_handler_closed(closing_id.clone(), by))),
                )
                .await
                .map_err(|_| BridgeError::ConnectionFailed {
                    id: connection_id.to_string(),
                    message: "connect timed out".into(),
                    cause: None,
                })?,
                None => {
                    handler
                        .start(Arc::new(move |by| this.on_handler_closed(closing_id.clone(), by)))
                        .await
                }
            };
            start_result?;

            self.handlers.insert(connection_id.clone(), handler);
            self.connections.set_transport_present(&connection_id, true)?;
            self.connections.update_status(&connection_id, ConnectionStatus::Connected, None)?;
            self.connections.reset_reconnect_count(&connection_id)?;
            Ok(())
        }
        .await;

        if let Err(e) = outcome {
            self.sse_server_adapters.remove(&connection_id);
            self.memory_client_peers.remove(&connection_id);
            if let Some((_, handler)) = self.handlers.remove(&connection_id) {
                let _ = handler.stop().await;
            }
            let _ = self
                .connections
                .update_status(&connection_id, ConnectionStatus::Error, Some(e.to_string()));
            self.connections.force_remove(&connection_id);
            return Err(BridgeError::ConnectionFailed {
                id: connection_id.to_string(),
                message: e.to_string(),
                cause: None,
            });
        }

        info!(connection = %connection_id, server = %server_id, "connection established");
        Ok(connection_id)
    }

    fn build_client_adapter(&self, client_transport: crate::config::TransportKind, connection_id: &ConnectionId) -> DynAdapter {
        use crate::config::TransportKind;
        match client_transport {
            TransportKind::Stdio => StdioClientAdapter::new(),
            TransportKind::Sse => {
                let adapter = SseServerAdapter::new(connection_id.clone());
                self.sse_server_adapters.insert(connection_id.clone(), Arc::clone(&adapter));
                adapter
            }
            TransportKind::Memory => {
                let (left, right) = crate::transport::memory::MemoryAdapter::pair();
                self.memory_client_peers.insert(connection_id.clone(), right);
                left
            }
        }
    }

    fn on_handler_closed(self: &Arc<Self>, connection_id: ConnectionId, by: ClosedBy) {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.handlers.remove(&connection_id);
            this.sse_server_adapters.remove(&connection_id);
            this.memory_client_peers.remove(&connection_id);
            let status = match by {
                ClosedBy::Server => ConnectionStatus::Disconnected,
                ClosedBy::Client => ConnectionStatus::Disconnected,
            };
            if let Err(e) = this.connections.update_status(&connection_id, status, None) {
                warn!(connection = %connection_id, "failed to record closed connection: {e}");
            }
        });
    }

    /// **disconnect**.
    pub async fn disconnect(&self, connection_id: &ConnectionId) -> BridgeResult<()> {
        let snapshot = self.connections.get(connection_id)?;
        if matches!(snapshot.status, ConnectionStatus::Disconnected | ConnectionStatus::Disconnecting) {
            return Ok(());
        }
        self.connections.update_status(connection_id, ConnectionStatus::Disconnecting, None)?;

        if let Some((_, handler)) = self.handlers.remove(connection_id) {
            handler.stop().await?;
        }
        self.sse_server_adapters.remove(connection_id);
        self.memory_client_peers.remove(connection_id);
        self.connections.set_transport_present(connection_id, false)?;
        self.connections.update_status(connection_id, ConnectionStatus::Disconnected, None)?;
        Ok(())
    }

    /// `POST /api/connections/{id}/reconnect`: disconnect (if live) and
    /// re-establish using the connection's own declared config. Like the
    /// hot-swap's reconnect step, this may mint a fresh connection id —
    /// the admin surface returns the new one.
    pub async fn reconnect(self: &Arc<Self>, connection_id: &ConnectionId) -> BridgeResult<ConnectionId> {
        let snapshot = self.connections.get(connection_id)?;
        self.disconnect(connection_id).await?;
        self.connections.remove(connection_id)?;
        let mut config = snapshot.config;
        config.id = None;
        self.connect(config, ConnectHints::default()).await
    }

    async fn disconnect_all_for_server(&self, server_id: &ServerId) {
        for snapshot in self.connections.connected_to_server(server_id) {
            if let Some(id) = snapshot.config.id
                && let Err(e) = self.disconnect(&id).await
            {
                warn!(connection = %id, "disconnect during server stop failed: {e}");
            }
        }
    }

    /// **updateEnvironment** — the hot-swap.
    pub async fn update_environment(self: &Arc<Self>, server_id: &ServerId, env_delta: std::collections::HashMap<String, String>) -> BridgeResult<()> {
        let restart_required = self.servers.merge_env(server_id, env_delta)?;
        if !restart_required {
            return Ok(());
        }
        self.hot_swap(server_id).await
    }

    /// Connection-registry-first, server-registry-second: every
    /// prior connection is `Disconnected` before the server leaves
    /// `Running`, and the server re-enters `Running` before reconnecting
    /// any of them, so no caller ever observes a started-but-unreconnected
    /// server with stale clients still attached.
    async fn hot_swap(self: &Arc<Self>, server_id: &ServerId) -> BridgeResult<()> {
        let snapshots = self.connections.connected_to_server(server_id);
        let mut configs = Vec::with_capacity(snapshots.len());
        for snapshot in snapshots {
            let Some(id) = snapshot.config.id.clone() else { continue };
            if let Err(e) = self.disconnect(&id).await {
                warn!(connection = %id, "disconnect before hot-swap failed: {e}");
            }
            configs.push(snapshot.config);
        }

        self.supervisor.restart(server_id).await?;

        for mut config in configs {
            config.id = None; // reconnecting mints a fresh id rather than preserving the original
            if let Err(e) = self.connect(config, ConnectHints::default()).await {
                warn!(server = %server_id, "reconnect after hot-swap failed: {e}");
            }
        }
        Ok(())
    }
}
