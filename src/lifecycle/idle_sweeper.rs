use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::activity::ActivityLedger;
use crate::container_management::{RuntimeGateway, TimeoutPolicy};
use crate::error_handling::types::GatewayError;

/// Grace period handed to the runtime when stopping an idle container: none.
pub const STOP_GRACE_PERIOD_SECS: i64 = 0;

/// Outcome of one sweep cycle.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SweepReport {
    /// Eligible running containers that were evaluated.
    pub evaluated: usize,
    /// Containers stopped during this cycle.
    pub stopped: Vec<String>,
    /// Containers whose stop request failed; they are retried next cycle.
    pub failed: Vec<String>,
}

/// Background janitor stopping managed containers that stayed idle past their timeout.
///
/// One cycle lists running containers, keeps the eligible ones, and stops every container
/// whose time since last access exceeds its effective timeout. A listing failure aborts
/// the cycle and the loop retries after a short backoff; a failed stop only affects that
/// one container and its ledger entry is kept so the next cycle tries again.
pub struct IdleSweeper {
    gateway: Arc<dyn RuntimeGateway>,
    ledger: Arc<ActivityLedger>,
    policy: TimeoutPolicy,
    interval: Duration,
    backoff: Duration,
}

impl IdleSweeper {
    pub fn new(
        gateway: Arc<dyn RuntimeGateway>,
        ledger: Arc<ActivityLedger>,
        policy: TimeoutPolicy,
        interval: Duration,
        backoff: Duration,
    ) -> Self {
        Self {
            gateway,
            ledger,
            policy,
            interval,
            backoff,
        }
    }

    /// Runs a single listing/deciding/stopping pass.
    pub async fn run_cycle(&self) -> Result<SweepReport, GatewayError> {
        debug!("Monitoring containers...");
        let containers = self.gateway.list_containers(false).await?;

        let mut report = SweepReport::default();
        for container in containers
            .iter()
            .filter(|c| c.state.is_running() && self.policy.is_eligible(c))
        {
            report.evaluated += 1;
            let timeout = self.policy.resolve(container);
            let observed_at = Instant::now();

            if !self.ledger.is_idle(&container.id, timeout) {
                debug!(
                    "Container {} still active (idle {:?}, timeout {:?})",
                    container.display_name(),
                    self.ledger.time_since_access(&container.id),
                    timeout
                );
                continue;
            }

            match self
                .gateway
                .stop_container(&container.id, STOP_GRACE_PERIOD_SECS)
                .await
            {
                Ok(()) => {
                    info!(
                        "Stopped container {} ({}) due to inactivity",
                        container.display_name(),
                        container.id
                    );
                    self.ledger.forget_if_idle_since(&container.id, observed_at);
                    report.stopped.push(container.id.clone());
                }
                Err(GatewayError::NotFound(_)) => {
                    warn!(
                        "Container {} vanished before it could be stopped",
                        container.id
                    );
                    self.ledger.forget_if_idle_since(&container.id, observed_at);
                }
                Err(e) => {
                    error!("Error stopping container {}: {}", container.id, e);
                    report.failed.push(container.id.clone());
                }
            }
        }

        debug!(
            "Sweep cycle done: evaluated={}, stopped={}, failed={}",
            report.evaluated,
            report.stopped.len(),
            report.failed.len()
        );
        Ok(report)
    }

    /// Sweeps until `shutdown` flips to `true` (or its sender is dropped).
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Idle sweeper started (interval {:?}, default timeout {:?})",
            self.interval,
            self.policy.default_timeout()
        );
        loop {
            if *shutdown.borrow() {
                break;
            }

            let pause = match self.run_cycle().await {
                Ok(_) => self.interval,
                Err(e) => {
                    error!("Error fetching containers: {}", e);
                    self.backoff
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                _ = shutdown.changed() => break,
            }
        }
        info!("Idle sweeper stopped");
    }
}
