//! Server Supervisor: brings a declared server to `Running` or
//! `Stopped`, owning its process and backend adapter.
//!
//! The process handle lives behind a `tokio::sync::Mutex` that both the
//! exit watcher and `stop()` can reach — polling `try_wait()` under a
//! shared lock rather than consuming the child with an owned `wait()`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::process::Child;
use tokio::sync::{Mutex as TokioMutex, Notify};
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::config::TransportKind;
use crate::error::{BridgeError, BridgeResult};
use crate::ids::ServerId;
use crate::registry::{ServerRegistry, ServerStatus};
use crate::transport::memory::MemoryAdapter;
use crate::transport::sse::{SseClientAdapter, SseClientEndpoint};
use crate::transport::stdio::StdioServerAdapter;
use crate::transport::{DynAdapter, Fanout};

/// Grace period `stop()` waits for a child to exit before force-killing.
const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);
/// Poll interval for the process-exit watcher's `try_wait` loop.
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

struct RunningServer {
    process: Arc<TokioMutex<Option<Child>>>,
    fanout: Arc<Fanout>,
    /// The far half of a memory-transport pair, for an embedded
    /// in-process backend (or a test) to drive directly.
    peer: Option<DynAdapter>,
    restart_cancel: Arc<Notify>,
}

/// Brings a `ServerInstance` from its current status to `Running` or
/// `Stopped`. Owns process and backend-adapter lifetime; the registry
/// only tracks status and handle *presence*.
pub struct Supervisor {
    registry: Arc<ServerRegistry>,
    running: DashMap<ServerId, RunningServer>,
}

impl Supervisor {
    #[must_use]
    pub fn new(registry: Arc<ServerRegistry>) -> Arc<Self> {
        Arc::new(Self {
            registry,
            running: DashMap::new(),
        })
    }

    /// A connection-scoped server-side adapter for `id`, fanned out
    /// from the single backend the supervisor owns. Requires `Running`.
    pub fn server_adapter(&self, id: &ServerId) -> BridgeResult<DynAdapter> {
        let running = self
            .running
            .get(id)
            .ok_or_else(|| BridgeError::invalid_server_state(id, self.current_status(id), "attach connection"))?;
        Ok(running.fanout.subscriber())
    }

    /// The in-process counterpart of a memory-transport server, for
    /// embedding a backend implementation directly in this process.
    #[must_use]
    pub fn memory_peer(&self, id: &ServerId) -> Option<DynAdapter> {
        self.running.get(id).and_then(|r| r.peer.clone())
    }

    fn current_status(&self, id: &ServerId) -> ServerStatus {
        self.registry.get(id).map(|s| s.status).unwrap_or(ServerStatus::Stopped)
    }

    /// Idempotent: returns immediately if already `Running` or `Starting`.
    pub async fn start(self: &Arc<Self>, id: &ServerId) -> BridgeResult<()> {
        let snapshot = self.registry.get(id)?;
        if matches!(snapshot.status, ServerStatus::Running | ServerStatus::Starting) {
            return Ok(());
        }
        self.start_fresh(id, false).await
    }

    async fn start_fresh(self: &Arc<Self>, id: &ServerId, is_restart_attempt: bool) -> BridgeResult<()> {
        self.registry.update_status(id, ServerStatus::Starting, None)?;
        let config = self.registry.config(id)?;

        let (adapter, process, peer) = match config.transport {
            TransportKind::Stdio => match StdioServerAdapter::spawn(&config) {
                Ok((adapter, child)) => (adapter as DynAdapter, Some(child), None),
                Err(e) => {
                    self.registry.update_status(id, ServerStatus::Error, Some(e.to_string()))?;
                    return Err(e);
                }
            },
            TransportKind::Sse => {
                let options = config.sse_options.as_ref().ok_or_else(|| BridgeError::Validation {
                    message: "sse transport requires sse_options".into(),
                })?;
                let endpoint = SseClientEndpoint {
                    stream_url: format!("http://{}:{}/sse", options.host, options.port),
                    post_url: format!("http://{}:{}/rpc", options.host, options.port),
                    headers: HashMap::new(),
                };
                (SseClientAdapter::new(endpoint) as DynAdapter, None, None)
            }
            TransportKind::Memory => {
                let (left, right) = MemoryAdapter::pair();
                (left as DynAdapter, None, Some(right as DynAdapter))
            }
        };

        if let Err(e) = adapter.start().await {
            self.registry.update_status(id, ServerStatus::Error, Some(e.to_string()))?;
            return Err(BridgeError::ServerStartFailed {
                id: id.clone(),
                message: e.to_string(),
                cause: None,
            });
        }

        let fanout = Fanout::wrap(adapter);
        let restart_cancel = Arc::new(Notify::new());
        let process_slot = Arc::new(TokioMutex::new(process));

        if process_slot.lock().await.is_some() {
            self.registry.set_process_present(id, true)?;
            self.spawn_exit_watcher(id.clone(), Arc::clone(&process_slot), Arc::clone(&restart_cancel));
        }

        self.registry.set_transport_present(id, true)?;
        self.running.insert(
            id.clone(),
            RunningServer {
                process: process_slot,
                fanout,
                peer,
                restart_cancel,
            },
        );

        if !is_restart_attempt {
            self.registry.reset_restart_count(id)?;
        }
        self.registry.update_status(id, ServerStatus::Running, None)?;
        info!(server = %id, "server running");
        Ok(())
    }

    fn spawn_exit_watcher(self: &Arc<Self>, id: ServerId, process: Arc<TokioMutex<Option<Child>>>, cancel: Arc<Notify>) {
        let supervisor = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(EXIT_POLL_INTERVAL).await;
                let mut guard = process.lock().await;
                let Some(child) = guard.as_mut() else {
                    return; // stop() already took the handle.
                };
                match child.try_wait() {
                    Ok(Some(status)) => {
                        drop(guard);
                        info!(server = %id, %status, "child process exited");
                        supervisor.on_process_exit(&id, cancel).await;
                        return;
                    }
                    Ok(None) => {} // still running
                    Err(e) => {
                        drop(guard);
                        error!(server = %id, "failed to poll child process: {e}");
                        return;
                    }
                }
            }
        });
    }

    /// Process exit vs operator `stop()` race: operator
    /// `Stopping` always takes precedence. If the instance is still
    /// `Running` when the exit lands, it transitions to `Stopped` and
    /// consults `shouldRestart`; a restart attempt afterwards is
    /// cancellable by a subsequent `stop`/`unregister` via `cancel`.
    async fn on_process_exit(self: &Arc<Self>, id: &ServerId, cancel: Arc<Notify>) {
        let Ok(snapshot) = self.registry.get(id) else {
            return; // unregistered already
        };
        if snapshot.status == ServerStatus::Stopping {
            return; // operator-initiated stop absorbs this exit
        }

        self.running.remove(id);
        let _ = self.registry.set_process_present(id, false);
        let _ = self.registry.set_transport_present(id, false);
        let _ = self.registry.update_status(id, ServerStatus::Stopped, None);

        if !self.registry.should_restart(id) {
            return;
        }
        let Ok(restart_count) = self.registry.increment_restart_count(id) else {
            return;
        };
        let delay = self.registry.restart_delay(id);
        info!(server = %id, restart_count, ?delay, "scheduling crash restart");

        let supervisor = Arc::clone(self);
        let id = id.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = cancel.notified() => {
                    info!(server = %id, "pending restart cancelled");
                    return;
                }
            }
            if supervisor.registry.get(&id).is_err() {
                return; // unregistered while waiting
            }
            if let Err(e) = supervisor.start_fresh(&id, true).await {
                warn!(server = %id, "crash restart failed: {e}");
            }
        });
    }

    /// Idempotent: returns immediately if already `Stopped` or `Stopping`.
    pub async fn stop(&self, id: &ServerId) -> BridgeResult<()> {
        let snapshot = self.registry.get(id)?;
        if matches!(snapshot.status, ServerStatus::Stopped | ServerStatus::Stopping) {
            return Ok(());
        }
        self.registry.update_status(id, ServerStatus::Stopping, None)?;

        let Some((_, running)) = self.running.remove(id) else {
            self.registry.update_status(id, ServerStatus::Stopped, None)?;
            return Ok(());
        };
        running.restart_cancel.notify_waiters();

        if let Err(e) = running.fanout_close().await {
            warn!(server = %id, "server adapter close failed: {e}");
        }

        if let Some(mut child) = running.process.lock().await.take() {
            if let Err(e) = child.start_kill() {
                warn!(server = %id, "failed to send kill signal: {e}");
            }
            match timeout(SHUTDOWN_GRACE_PERIOD, child.wait()).await {
                Ok(Ok(status)) => info!(server = %id, %status, "child process exited"),
                Ok(Err(e)) => error!(server = %id, "error waiting for child exit: {e}"),
                Err(_) => {
                    warn!(server = %id, "shutdown timed out, forcing kill");
                    if let Err(e) = child.kill().await {
                        error!(server = %id, "force kill failed: {e}");
                    }
                }
            }
        }

        self.registry.set_process_present(id, false)?;
        self.registry.set_transport_present(id, false)?;
        self.registry.update_status(id, ServerStatus::Stopped, None)?;
        info!(server = %id, "server stopped");
        Ok(())
    }

    /// `stop` then `start` — the only primitive the Bridge Manager uses
    /// for the hot-swap path.
    pub async fn restart(self: &Arc<Self>, id: &ServerId) -> BridgeResult<()> {
        self.stop(id).await?;
        self.start(id).await
    }
}

impl RunningServer {
    async fn fanout_close(&self) -> BridgeResult<()> {
        self.fanout.close_backend().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LifecyclePolicy, ServerConfig, TransportKind};

    fn memory_config(id: &str) -> ServerConfig {
        ServerConfig {
            id: ServerId::from(id),
            name: id.to_string(),
            version: "1.0.0".into(),
            command: String::new(),
            args: vec![],
            working_dir: None,
            env: HashMap::new(),
            transport: TransportKind::Memory,
            sse_options: None,
            lifecycle: LifecyclePolicy::default(),
        }
    }

    #[tokio::test]
    async fn start_memory_server_reaches_running() {
        let registry = Arc::new(ServerRegistry::new());
        registry.register(memory_config("s1")).unwrap();
        let supervisor = Supervisor::new(Arc::clone(&registry));
        let id = ServerId::from("s1");

        supervisor.start(&id).await.unwrap();
        assert_eq!(registry.get(&id).unwrap().status, ServerStatus::Running);
        assert!(supervisor.memory_peer(&id).is_some());
    }

    #[tokio::test]
    async fn stop_then_start_is_idempotent() {
        let registry = Arc::new(ServerRegistry::new());
        registry.register(memory_config("s1")).unwrap();
        let supervisor = Supervisor::new(Arc::clone(&registry));
        let id = ServerId::from("s1");

        supervisor.start(&id).await.unwrap();
        supervisor.start(&id).await.unwrap();
        supervisor.stop(&id).await.unwrap();
        supervisor.stop(&id).await.unwrap();
        assert_eq!(registry.get(&id).unwrap().status, ServerStatus::Stopped);
    }

    #[tokio::test]
    async fn crash_restart_bounded_by_max_restarts() {
        let registry = Arc::new(ServerRegistry::new());
        let mut config = ServerConfig {
            id: ServerId::from("s1"),
            name: "s1".into(),
            version: "1.0.0".into(),
            command: "false".into(),
            args: vec![],
            working_dir: None,
            env: HashMap::new(),
            transport: TransportKind::Stdio,
            sse_options: None,
            lifecycle: LifecyclePolicy::default(),
        };
        config.lifecycle.auto_restart = true;
        config.lifecycle.max_restarts = Some(3);
        config.lifecycle.restart_delay = Duration::from_millis(10);
        registry.register(config).unwrap();

        let supervisor = Supervisor::new(Arc::clone(&registry));
        let id = ServerId::from("s1");
        supervisor.start(&id).await.unwrap();

        tokio::time::sleep(Duration::from_secs(1)).await;

        let snapshot = registry.get(&id).unwrap();
        assert_eq!(snapshot.status, ServerStatus::Stopped);
        assert_eq!(snapshot.restart_count, 3);
    }
}
