use std::time::Duration;

use serde::Deserialize;

use crate::error::EngineError;
use crate::parser::PayloadLayout;

/// Root configuration — parsed from TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    #[serde(default)]
    pub listener: ListenerConfig,

    /// Field positions inside the broadcast payload.
    #[serde(default)]
    pub layout: PayloadLayout,

    #[serde(default)]
    pub ingest: IngestConfig,

    pub store: StoreConfig,

    /// Absent table = nobody is notified.
    #[serde(default)]
    pub notifier: Option<NotifierConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListenerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Receive buffer size; longer datagrams are truncated by the OS.
    #[serde(default = "default_max_datagram")]
    pub max_datagram: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_datagram: default_max_datagram(),
        }
    }
}

impl ListenerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    7000
}
fn default_max_datagram() -> usize {
    65_535
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IngestConfig {
    /// Pause after every datagram, persisted or not.
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
    /// `movement_detected` values that are never persisted
    /// (e.g. `"[No movement detected]"`).
    #[serde(default)]
    pub ignore_movement: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            throttle_ms: default_throttle_ms(),
            ignore_movement: Vec::new(),
        }
    }
}

impl IngestConfig {
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}

fn default_throttle_ms() -> u64 {
    5_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Built-in store: "http" or "memory".
    pub kind: String,
    #[serde(default)]
    pub config: Option<toml::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    /// Built-in notifier: "http" or "none".
    pub kind: String,
    /// List subscribers and log the emails instead of sending them.
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub config: Option<toml::Value>,
}

impl RelayConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, EngineError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| EngineError::Config(format!("{path}: {e}")))?;
        Self::parse(&content).map_err(|e| e.with_context(path))
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, EngineError> {
        toml::from_str(toml_str).map_err(|e| EngineError::Config(e.to_string()))
    }
}

/// Serialize an optional collaborator config table to a JSON string (or "{}").
pub fn config_json_or_empty(val: &Option<toml::Value>) -> Result<String, EngineError> {
    match val {
        Some(v) => serde_json::to_string(v).map_err(|e| EngineError::Config(format!("serialize config: {e}"))),
        None => Ok("{}".to_string()),
    }
}
