//! Label driven management policy: which containers are managed, and how long they may idle.

use log::debug;
use std::time::Duration;

use crate::configuration::types::LifecycleConfig;
use crate::container_management::types::ContainerDescriptor;

/// Label keys a container uses to opt into automatic lifecycle management.
#[derive(Debug, Clone, PartialEq)]
pub struct ManagementLabels {
    pub enabled_label: String,
    pub timeout_label: String,
}

impl ManagementLabels {
    pub fn from_config(config: &LifecycleConfig) -> Self {
        Self {
            enabled_label: config.enabled_label.clone(),
            timeout_label: config.timeout_label.clone(),
        }
    }

    /// True iff the enabled label is present and truthy (`true`, `1`, `yes`, `on`).
    pub fn is_eligible(&self, container: &ContainerDescriptor) -> bool {
        container
            .label(&self.enabled_label)
            .map(|value| {
                matches!(
                    value.trim().to_ascii_lowercase().as_str(),
                    "true" | "1" | "yes" | "on"
                )
            })
            .unwrap_or(false)
    }
}

/// Resolves the effective idle timeout of a container.
///
/// Malformed declarations never fail: they fall back to the default so that one bad label
/// cannot abort a sweep cycle.
#[derive(Debug, Clone)]
pub struct TimeoutPolicy {
    labels: ManagementLabels,
    default_timeout: Duration,
}

impl TimeoutPolicy {
    pub fn new(labels: ManagementLabels, default_timeout: Duration) -> Self {
        Self {
            labels,
            default_timeout,
        }
    }

    pub fn labels(&self) -> &ManagementLabels {
        &self.labels
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub fn is_eligible(&self, container: &ContainerDescriptor) -> bool {
        self.labels.is_eligible(container)
    }

    pub fn resolve(&self, container: &ContainerDescriptor) -> Duration {
        let Some(raw) = container.label(&self.labels.timeout_label) else {
            return self.default_timeout;
        };
        match raw.trim().parse::<u64>() {
            Ok(minutes) if minutes > 0 => Duration::from_secs(minutes.saturating_mul(60)),
            _ => {
                debug!(
                    "Ignoring invalid timeout declaration {:?} on container {}",
                    raw, container.id
                );
                self.default_timeout
            }
        }
    }
}
