//! Runtime Gateway trait
//!
//! This module defines the `RuntimeGateway` trait, the only path through which the rest of
//! the crate talks to the container runtime.
//!
//! Implementors must be safe to share between the idle sweeper task and every inbound
//! request task. Every method is a network round-trip and may suspend.

use crate::container_management::types::ContainerDescriptor;
use crate::error_handling::types::GatewayError;
use async_trait::async_trait;

#[async_trait]
pub trait RuntimeGateway: Send + Sync {
    /// Lists containers. Stopped containers are included only when `include_stopped` is set.
    async fn list_containers(
        &self,
        include_stopped: bool,
    ) -> Result<Vec<ContainerDescriptor>, GatewayError>;

    /// Starts a container. Starting an already running container must succeed.
    async fn start_container(&self, id: &str) -> Result<(), GatewayError>;

    /// Stops a container, killing it after `grace_period_secs` (0 stops immediately).
    async fn stop_container(&self, id: &str, grace_period_secs: i64) -> Result<(), GatewayError>;

    /// Checks that the runtime API answers.
    async fn ping(&self) -> Result<(), GatewayError>;
}
