//! Application-level configuration and startup helpers for the
//! `mcp-bridge` binary: where the bridge listens, which servers it
//! declares at boot, and how `tracing` is wired up from `LOG_LEVEL`.

use std::net::IpAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::ServerConfig;

/// Default admin HTTP port, overridable via the `PORT` env var.
pub const DEFAULT_PORT: u16 = 3000;

/// Declarative bridge configuration: where the admin surface listens
/// and which servers are registered at boot. Config files are JSON —
/// consistent with the wire format already being JSON.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BridgeConfig {
    /// Listen interface for the admin HTTP surface.
    #[serde(default)]
    pub host: Option<String>,
    /// Listen port for the admin HTTP surface.
    #[serde(default)]
    pub port: Option<u16>,
    /// Servers to register (not start) when the bridge boots.
    #[serde(default)]
    pub servers: Vec<ServerConfig>,
}

impl BridgeConfig {
    /// Load from a JSON file on disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BootstrapError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| BootstrapError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        serde_json::from_str(&contents).map_err(|e| BootstrapError::Parse {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Apply `PORT`/`HOST` environment variable overrides: env vars
    /// win over whatever the config file declared.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(port) = std::env::var("PORT")
            && let Ok(parsed) = port.parse()
        {
            self.port = Some(parsed);
        }
        if let Ok(host) = std::env::var("HOST") {
            self.host = Some(host);
        }
        self
    }

    /// Resolved listen address, defaulting host to `0.0.0.0` and port
    /// to [`DEFAULT_PORT`].
    #[must_use]
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        let ip: IpAddr = self
            .host
            .as_deref()
            .and_then(|h| h.parse().ok())
            .unwrap_or(IpAddr::from([0, 0, 0, 0]));
        std::net::SocketAddr::new(ip, self.port.unwrap_or(DEFAULT_PORT))
    }
}

/// Errors loading or parsing [`BridgeConfig`].
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Initialize `tracing-subscriber` from `LOG_LEVEL` (one of
/// `debug|info|warn|error`), falling back to `RUST_LOG` if set.
pub fn init_tracing() {
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_win_over_file_values() {
        // SAFETY: test runs serially within this process; no other test
        // in this module touches these variables.
        unsafe {
            std::env::set_var("PORT", "4242");
        }
        let config = BridgeConfig {
            host: None,
            port: Some(3000),
            servers: vec![],
        }
        .with_env_overrides();
        assert_eq!(config.port, Some(4242));
        unsafe {
            std::env::remove_var("PORT");
        }
    }

    #[test]
    fn socket_addr_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.socket_addr().port(), DEFAULT_PORT);
    }
}
