//! Hot-reloadable server configuration: a JSON file re-read behind
//! `/reload`. The knobs this service needs are operational: where to
//! bind, how deep the per-session mailbox and the matchmaking
//! notification channels are, and how often the watchdog sweeps stale
//! matchmaking waiters.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::RwLock;

use crate::error::ConfigError;

const CONFIG_PATH: &str = "ServerConfig.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
    pub session_mailbox_capacity: usize,
    pub watchdog_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            session_mailbox_capacity: 64,
            watchdog_interval_secs: 1200,
        }
    }
}

/// Holds the live, swappable configuration. Reads take a read-lock only,
/// so hot reload never blocks request handling for longer than a copy.
#[derive(Default)]
pub struct ConfigHandle {
    inner: RwLock<Arc<ServerConfig>>,
}

impl ConfigHandle {
    pub fn new(initial: ServerConfig) -> Self {
        Self { inner: RwLock::new(Arc::new(initial)) }
    }

    pub async fn current(&self) -> Arc<ServerConfig> {
        self.inner.read().await.clone()
    }

    async fn replace(&self, config: ServerConfig) {
        *self.inner.write().await = Arc::new(config);
    }
}

/// Reads `ServerConfig.json` from the working directory and installs it.
/// Missing file is not an error, it just means "keep defaults"; a
/// malformed one is reported so `/reload` can surface it to the operator.
pub async fn reload_config(handle: &ConfigHandle) -> Result<(), ConfigError> {
    let text = match fs::read_to_string(CONFIG_PATH).await {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(source) => return Err(ConfigError::Read { path: CONFIG_PATH.to_string(), source }),
    };
    let parsed: ServerConfig = serde_json::from_str(&text)
        .map_err(|source| ConfigError::Parse { path: CONFIG_PATH.to_string(), source })?;
    handle.replace(parsed).await;
    Ok(())
}
