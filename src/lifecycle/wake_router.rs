use log::{debug, info, warn};
use std::sync::Arc;

use crate::activity::ActivityLedger;
use crate::container_management::{ManagementLabels, RuntimeGateway};
use crate::error_handling::types::WakeError;

/// Result of a successful wake: the caller should re-issue its request.
#[derive(Debug, Clone, PartialEq)]
pub struct WakeOutcome {
    pub container_id: String,
    pub container_name: String,
    /// Whether a start request was issued for this wake.
    pub started: bool,
}

/// Resolves an inbound host to a container, starts it when needed and records the access.
///
/// Concurrent wakes for the same host are not deduplicated: each may issue a start, which
/// the runtime treats as a no-op once the container runs. Every successful wake refreshes
/// the idle clock, including wakes of running containers and of unmanaged ones (which are
/// never started automatically).
pub struct WakeRouter {
    gateway: Arc<dyn RuntimeGateway>,
    ledger: Arc<ActivityLedger>,
    labels: ManagementLabels,
}

impl WakeRouter {
    pub fn new(
        gateway: Arc<dyn RuntimeGateway>,
        ledger: Arc<ActivityLedger>,
        labels: ManagementLabels,
    ) -> Self {
        Self {
            gateway,
            ledger,
            labels,
        }
    }

    pub async fn wake(&self, host: &str) -> Result<WakeOutcome, WakeError> {
        let host = normalize_host(host);
        if host.is_empty() {
            return Err(WakeError::MissingHost);
        }
        debug!("Received request for host: {}", host);

        let containers = self
            .gateway
            .list_containers(true)
            .await
            .map_err(WakeError::GatewayUnavailable)?;

        let mut matches = containers.into_iter().filter(|c| c.answers_to(&host));
        let target = matches
            .next()
            .ok_or_else(|| WakeError::NotFound(host.clone()))?;
        let others = matches.count();
        if others > 0 {
            warn!(
                "Host {} matches {} more container(s), routing to {}",
                host,
                others,
                target.display_name()
            );
        }

        let mut started = false;
        if !target.state.is_running() {
            if self.labels.is_eligible(&target) {
                self.gateway
                    .start_container(&target.id)
                    .await
                    .map_err(|e| WakeError::StartFailed {
                        container_id: target.id.clone(),
                        reason: e.to_string(),
                    })?;
                info!(
                    "Started container {} due to incoming request for host {}",
                    target.id, host
                );
                started = true;
            } else {
                debug!(
                    "Container {} is {} but not managed, leaving it alone",
                    target.display_name(),
                    target.state
                );
            }
        }

        self.ledger.record_access(&target.id);

        Ok(WakeOutcome {
            container_name: target.display_name().to_string(),
            container_id: target.id,
            started,
        })
    }
}

/// Lower-cases a Host header value and drops its port and trailing dot.
pub fn normalize_host(raw: &str) -> String {
    let raw = raw.trim();
    let without_port = if let Some(rest) = raw.strip_prefix('[') {
        // [v6]:port
        rest.split(']').next().unwrap_or(rest)
    } else {
        match raw.rsplit_once(':') {
            Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
            _ => raw,
        }
    };
    without_port.trim_end_matches('.').to_ascii_lowercase()
}
