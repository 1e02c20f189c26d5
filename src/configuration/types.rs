use serde::{Deserialize, Serialize};

/// Address the HTTP surface listens on.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: String::from("0.0.0.0"),
            port: 8080,
        }
    }
}

/// Connection settings for the container runtime API.
///
/// `socket` accepts `unix:///path/to/docker.sock`, `tcp://host:port` or `http://host:port`.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerConfig {
    pub socket: String,
    pub timeout_secs: u64,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            socket: String::from("tcp://dockerproxy:2375"),
            timeout_secs: 120,
        }
    }
}

/// Idle sweeping and label conventions.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Idle timeout applied when a container declares none, in minutes.
    pub default_idle_timeout_minutes: u64,
    /// Pause between two sweep cycles.
    pub sweep_interval_secs: u64,
    /// Pause before retrying after the container listing failed.
    pub sweep_backoff_secs: u64,
    /// Label opting a container into automatic start/stop.
    pub enabled_label: String,
    /// Label carrying a per-container idle timeout in minutes.
    pub timeout_label: String,
    /// Number of independently locked ledger shards.
    pub ledger_shards: usize,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            default_idle_timeout_minutes: 15,
            sweep_interval_secs: 60,
            sweep_backoff_secs: 2,
            enabled_label: String::from("dockershocker.enabled"),
            timeout_label: String::from("dockershocker.timeout_minutes"),
            ledger_shards: 16,
        }
    }
}

/// Token bucket guarding the inbound HTTP surface.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdmissionConfig {
    pub rate_per_second: f64,
    pub burst: u32,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            rate_per_second: 5.0,
            burst: 10,
        }
    }
}
