//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use super::defaults::default_event_queue_size;
use super::server::ServerSettings;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Client network configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Client-wide settings.
    #[serde(default)]
    pub client: ClientConfig,
    /// Configured servers, one per network.
    #[serde(default)]
    pub servers: Vec<ServerSettings>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Look up a server block by network name.
    pub fn server(&self, name: &str) -> Option<&ServerSettings> {
        self.servers.iter().find(|s| s.name == name)
    }
}

/// Client-wide settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Capacity of the shared inbound event channel.
    #[serde(default = "default_event_queue_size")]
    pub event_queue_size: usize,
    /// Networks connected at startup. Empty means every configured server.
    #[serde(default)]
    pub autoconnect: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            event_queue_size: default_event_queue_size(),
            autoconnect: Vec::new(),
        }
    }
}
