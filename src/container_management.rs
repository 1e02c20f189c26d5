//! Container management subsystem.
//!
//! This module exposes the contract the rest of the crate uses to talk to the container
//! runtime, its Docker implementation, and the label policy deciding which containers are
//! managed and how long they may stay idle.
//!
//! Re-exports:
//! - [`RuntimeGateway`]: list/start/stop/ping contract, shared by every task.
//! - [`DockerGateway`]: production implementation on the Docker Engine API.
//! - [`ContainerDescriptor`], [`RunState`]: listing snapshot types.
//! - [`TimeoutPolicy`], [`ManagementLabels`]: eligibility and effective timeout.
//!
//! Example (non-running):
//! ```ignore
//! use lullaby::configuration::types::DockerConfig;
//! use lullaby::container_management::{DockerGateway, RuntimeGateway};
//!
//! let gateway = DockerGateway::connect(&DockerConfig::default())?;
//! let running = gateway.list_containers(false).await?;
//! println!("running: {}", running.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod docker_gateway;
pub mod gateway;
#[cfg(test)]
pub mod mock_gateway;
pub mod policy;
pub mod types;

pub use docker_gateway::DockerGateway;
pub use gateway::RuntimeGateway;
pub use policy::{ManagementLabels, TimeoutPolicy};
pub use types::{ContainerDescriptor, RunState};
