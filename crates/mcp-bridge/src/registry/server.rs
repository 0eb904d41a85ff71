//! Server Registry: a pure in-memory catalog of declared servers and
//! their runtime state, keyed by server id.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::config::ServerConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::ids::ServerId;

/// Runtime status of a declared server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    Stopped,
    Starting,
    Running,
    Stopping,
    Error,
}

impl std::fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Stopped => "Stopped",
            Self::Starting => "Starting",
            Self::Running => "Running",
            Self::Stopping => "Stopping",
            Self::Error => "Error",
        };
        write!(f, "{label}")
    }
}

/// Read-only projection of a server's state, safe to hand to callers
/// outside the registry (admin surface, tests). The live process and
/// adapter handles are owned by the Supervisor, not the registry (see
/// `supervisor.rs`); this tracks their *presence* only, which is enough
/// to check the invariant `status=Stopped ⇔ handles absent`.
#[derive(Debug, Clone)]
pub struct ServerSnapshot {
    pub config: ServerConfig,
    pub status: ServerStatus,
    pub has_process: bool,
    pub has_transport: bool,
    pub last_error: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub restart_count: u32,
}

struct ServerRecord {
    config: ServerConfig,
    status: ServerStatus,
    has_process: bool,
    has_transport: bool,
    last_error: Option<String>,
    start_time: Option<DateTime<Utc>>,
    restart_count: u32,
}

impl ServerRecord {
    fn snapshot(&self) -> ServerSnapshot {
        ServerSnapshot {
            config: self.config.clone(),
            status: self.status,
            has_process: self.has_process,
            has_transport: self.has_transport,
            last_error: self.last_error.clone(),
            start_time: self.start_time,
            restart_count: self.restart_count,
        }
    }
}

/// Pure in-memory catalog of servers keyed by id. Every operation is
/// synchronous and atomic with respect to the others.
#[derive(Default)]
pub struct ServerRegistry {
    servers: DashMap<ServerId, ServerRecord>,
    /// Registration order, for `list()` — a catalog, not a hash-ordered dump.
    insertion_order: std::sync::Mutex<Vec<ServerId>>,
}

impl ServerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new server in `Stopped`. Fails if `config.id` is taken.
    pub fn register(&self, config: ServerConfig) -> BridgeResult<ServerSnapshot> {
        config
            .validate()
            .map_err(|message| BridgeError::Validation { message })?;
        if self.servers.contains_key(&config.id) {
            return Err(BridgeError::server_exists(&config.id));
        }
        let record = ServerRecord {
            config: config.clone(),
            status: ServerStatus::Stopped,
            has_process: false,
            has_transport: false,
            last_error: None,
            start_time: None,
            restart_count: 0,
        };
        let snapshot = record.snapshot();
        self.insertion_order.lock().unwrap().push(config.id.clone());
        self.servers.insert(config.id, record);
        Ok(snapshot)
    }

    /// Remove a server. Requires `Stopped`.
    pub fn unregister(&self, id: &ServerId) -> BridgeResult<()> {
        {
            let record = self
                .servers
                .get(id)
                .ok_or_else(|| BridgeError::server_not_found(id))?;
            if record.status != ServerStatus::Stopped {
                return Err(BridgeError::invalid_server_state(id, record.status, "unregister"));
            }
        }
        self.servers.remove(id);
        self.insertion_order.lock().unwrap().retain(|existing| existing != id);
        Ok(())
    }

    pub fn get(&self, id: &ServerId) -> BridgeResult<ServerSnapshot> {
        self.servers
            .get(id)
            .map(|r| r.snapshot())
            .ok_or_else(|| BridgeError::server_not_found(id))
    }

    /// Full launch config, for the Supervisor's spawn path.
    pub fn config(&self, id: &ServerId) -> BridgeResult<ServerConfig> {
        self.servers
            .get(id)
            .map(|r| r.config.clone())
            .ok_or_else(|| BridgeError::server_not_found(id))
    }

    /// Registration order.
    #[must_use]
    pub fn list(&self) -> Vec<ServerSnapshot> {
        self.insertion_order
            .lock()
            .unwrap()
            .iter()
            .filter_map(|id| self.servers.get(id).map(|r| r.snapshot()))
            .collect()
    }

    pub fn update_status(
        &self,
        id: &ServerId,
        status: ServerStatus,
        error: Option<String>,
    ) -> BridgeResult<()> {
        let mut record = self
            .servers
            .get_mut(id)
            .ok_or_else(|| BridgeError::server_not_found(id))?;
        record.status = status;
        record.last_error = error;
        if status == ServerStatus::Running {
            record.start_time = Some(Utc::now());
        }
        Ok(())
    }

    pub fn set_process_present(&self, id: &ServerId, present: bool) -> BridgeResult<()> {
        let mut record = self
            .servers
            .get_mut(id)
            .ok_or_else(|| BridgeError::server_not_found(id))?;
        record.has_process = present;
        Ok(())
    }

    pub fn set_transport_present(&self, id: &ServerId, present: bool) -> BridgeResult<()> {
        let mut record = self
            .servers
            .get_mut(id)
            .ok_or_else(|| BridgeError::server_not_found(id))?;
        record.has_transport = present;
        Ok(())
    }

    pub fn increment_restart_count(&self, id: &ServerId) -> BridgeResult<u32> {
        let mut record = self
            .servers
            .get_mut(id)
            .ok_or_else(|| BridgeError::server_not_found(id))?;
        record.restart_count += 1;
        Ok(record.restart_count)
    }

    pub fn reset_restart_count(&self, id: &ServerId) -> BridgeResult<()> {
        let mut record = self
            .servers
            .get_mut(id)
            .ok_or_else(|| BridgeError::server_not_found(id))?;
        record.restart_count = 0;
        Ok(())
    }

    /// Apply a partial update to a server's declared config (admin
    /// surface `PUT /api/servers/{id}`). Requires `Stopped` — mutating
    /// launch parameters of a server with a live process or adapter
    /// would desync the registry from what's actually running. `id`
    /// and `transport` are immutable and not settable here.
    pub fn update_config<F>(&self, id: &ServerId, apply: F) -> BridgeResult<ServerSnapshot>
    where
        F: FnOnce(&mut ServerConfig),
    {
        let mut record = self
            .servers
            .get_mut(id)
            .ok_or_else(|| BridgeError::server_not_found(id))?;
        if record.status != ServerStatus::Stopped {
            return Err(BridgeError::invalid_server_state(id, record.status, "update"));
        }
        apply(&mut record.config);
        record.config.id = id.clone();
        record
            .config
            .validate()
            .map_err(|message| BridgeError::Validation { message })?;
        Ok(record.snapshot())
    }

    /// Merge `delta` into the server's declared env (delta overwrites on
    /// collision, unmentioned keys are preserved). Returns `true` iff a
    /// restart is required to apply the change (the server is currently
    /// Running). Rejected unless the instance is Stopped or Running, to
    /// avoid racing a concurrent Starting/Stopping transition.
    pub fn merge_env(&self, id: &ServerId, delta: HashMap<String, String>) -> BridgeResult<bool> {
        let mut record = self
            .servers
            .get_mut(id)
            .ok_or_else(|| BridgeError::server_not_found(id))?;
        if !matches!(record.status, ServerStatus::Stopped | ServerStatus::Running) {
            return Err(BridgeError::invalid_server_state(
                id,
                record.status,
                "updateEnvironment",
            ));
        }
        for (key, value) in delta {
            record.config.env.insert(key, value);
        }
        Ok(record.status == ServerStatus::Running)
    }

    #[must_use]
    pub fn should_restart(&self, id: &ServerId) -> bool {
        self.servers.get(id).is_some_and(|record| {
            let policy = &record.config.lifecycle;
            policy.auto_restart
                && policy
                    .max_restarts
                    .is_none_or(|max| record.restart_count < max)
        })
    }

    #[must_use]
    pub fn restart_delay(&self, id: &ServerId) -> Duration {
        self.servers
            .get(id)
            .map(|record| record.config.lifecycle.restart_delay)
            .unwrap_or(Duration::from_secs(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LifecyclePolicy, TransportKind};

    fn config(id: &str) -> ServerConfig {
        ServerConfig {
            id: ServerId::from(id),
            name: id.to_string(),
            version: "1.0.0".into(),
            command: "cat".into(),
            args: vec![],
            working_dir: None,
            env: HashMap::new(),
            transport: TransportKind::Stdio,
            sse_options: None,
            lifecycle: LifecyclePolicy::default(),
        }
    }

    #[test]
    fn register_rejects_duplicate_id() {
        let registry = ServerRegistry::new();
        registry.register(config("s1")).unwrap();
        let err = registry.register(config("s1")).unwrap_err();
        assert_eq!(err.code(), "AlreadyExists");
    }

    #[test]
    fn unregister_requires_stopped() {
        let registry = ServerRegistry::new();
        registry.register(config("s1")).unwrap();
        let id = ServerId::from("s1");
        registry.update_status(&id, ServerStatus::Running, None).unwrap();
        let err = registry.unregister(&id).unwrap_err();
        assert_eq!(err.code(), "InvalidState");

        registry.update_status(&id, ServerStatus::Stopped, None).unwrap();
        registry.unregister(&id).unwrap();
        assert!(registry.get(&id).is_err());
    }

    #[test]
    fn merge_env_reports_restart_required_only_when_running() {
        let registry = ServerRegistry::new();
        registry.register(config("s1")).unwrap();
        let id = ServerId::from("s1");

        let mut delta = HashMap::new();
        delta.insert("X".to_string(), "1".to_string());
        let restart_required = registry.merge_env(&id, delta).unwrap();
        assert!(!restart_required);
        assert_eq!(registry.get(&id).unwrap().config.env.get("X"), Some(&"1".to_string()));

        registry.update_status(&id, ServerStatus::Running, None).unwrap();
        let mut delta2 = HashMap::new();
        delta2.insert("X".to_string(), "2".to_string());
        assert!(registry.merge_env(&id, delta2).unwrap());
        assert_eq!(registry.get(&id).unwrap().config.env.get("X"), Some(&"2".to_string()));
    }

    #[test]
    fn should_restart_respects_max_restarts() {
        let registry = ServerRegistry::new();
        let mut cfg = config("s1");
        cfg.lifecycle.auto_restart = true;
        cfg.lifecycle.max_restarts = Some(2);
        registry.register(cfg).unwrap();
        let id = ServerId::from("s1");

        assert!(registry.should_restart(&id));
        registry.increment_restart_count(&id).unwrap();
        assert!(registry.should_restart(&id));
        registry.increment_restart_count(&id).unwrap();
        assert!(!registry.should_restart(&id));
    }

    #[test]
    fn update_config_rejects_unless_stopped() {
        let registry = ServerRegistry::new();
        registry.register(config("s1")).unwrap();
        let id = ServerId::from("s1");

        registry.update_config(&id, |c| c.name = "renamed".into()).unwrap();
        assert_eq!(registry.get(&id).unwrap().config.name, "renamed");

        registry.update_status(&id, ServerStatus::Running, None).unwrap();
        let err = registry.update_config(&id, |c| c.name = "again".into()).unwrap_err();
        assert_eq!(err.code(), "InvalidState");
    }
}
