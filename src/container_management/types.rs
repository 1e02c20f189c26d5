//! Core types used by the container management subsystem.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Coarse lifecycle state of a container as reported by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RunState {
    Running,
    Stopped,
    /// Any state the runtime is moving through (`restarting`, `paused`, `removing`, ...).
    Transitional(String),
}

impl RunState {
    /// Maps a Docker state string onto a [`RunState`].
    pub fn from_docker(state: &str) -> Self {
        match state {
            "running" => RunState::Running,
            "exited" | "created" | "dead" => RunState::Stopped,
            other => RunState::Transitional(other.to_string()),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Running => write!(f, "running"),
            RunState::Stopped => write!(f, "stopped"),
            RunState::Transitional(state) => write!(f, "{}", state),
        }
    }
}

/// Snapshot of one container as listed by the runtime gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerDescriptor {
    /// Stable identifier, unique per container instance.
    pub id: String,
    /// Runtime names, Docker prefixes them with `/`.
    pub names: Vec<String>,
    pub state: RunState,
    /// Human readable status line (e.g. `Up 3 minutes`).
    pub status: String,
    pub labels: HashMap<String, String>,
    /// Aliases across every attached network, in network name order.
    pub network_aliases: Vec<String>,
}

impl ContainerDescriptor {
    /// First runtime name without the leading `/`, or the id when the container is unnamed.
    pub fn display_name(&self) -> &str {
        self.names
            .first()
            .map(|name| name.trim_start_matches('/'))
            .unwrap_or(self.id.as_str())
    }

    /// Whether one of the network aliases equals `host` (case-insensitive).
    pub fn answers_to(&self, host: &str) -> bool {
        self.network_aliases
            .iter()
            .any(|alias| alias.eq_ignore_ascii_case(host))
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}
