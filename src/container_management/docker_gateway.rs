use async_trait::async_trait;
use bollard::container::{ListContainersOptions, StartContainerOptions, StopContainerOptions};
use bollard::errors::Error as BollardError;
use bollard::models::ContainerSummary;
use bollard::{Docker, API_DEFAULT_VERSION};
use log::{debug, info};

use crate::configuration::types::DockerConfig;
use crate::container_management::gateway::RuntimeGateway;
use crate::container_management::types::{ContainerDescriptor, RunState};
use crate::error_handling::types::GatewayError;

/// [`RuntimeGateway`] backed by the Docker Engine API.
///
/// Connects either through a unix socket (`unix:///var/run/docker.sock`) or over plain HTTP
/// (`tcp://dockerproxy:2375`), typically a read/write socket proxy.
pub struct DockerGateway {
    docker: Docker,
}

impl DockerGateway {
    /// Builds a client for the configured endpoint. No request is sent until first use.
    pub fn connect(config: &DockerConfig) -> Result<Self, GatewayError> {
        let socket = config.socket.as_str();
        let docker = if let Some(path) = socket.strip_prefix("unix://") {
            debug!("Connecting to Docker through unix socket {}", path);
            Docker::connect_with_unix(path, config.timeout_secs, API_DEFAULT_VERSION)
        } else {
            let address = match socket.strip_prefix("tcp://") {
                Some(rest) => format!("http://{}", rest),
                None => socket.to_string(),
            };
            debug!("Connecting to Docker over HTTP at {}", address);
            Docker::connect_with_http(&address, config.timeout_secs, API_DEFAULT_VERSION)
        }
        .map_err(|e| GatewayError::Unavailable(e.to_string()))?;

        info!("Docker client initialized for {}", socket);
        Ok(Self { docker })
    }
}

#[async_trait]
impl RuntimeGateway for DockerGateway {
    async fn list_containers(
        &self,
        include_stopped: bool,
    ) -> Result<Vec<ContainerDescriptor>, GatewayError> {
        let options = ListContainersOptions::<String> {
            all: include_stopped,
            ..Default::default()
        };
        let summaries = self
            .docker
            .list_containers(Some(options))
            .await
            .map_err(|e| classify_error(e, "<list>"))?;

        Ok(summaries.into_iter().filter_map(to_descriptor).collect())
    }

    async fn start_container(&self, id: &str) -> Result<(), GatewayError> {
        match self
            .docker
            .start_container(id, None::<StartContainerOptions<String>>)
            .await
        {
            Ok(()) => Ok(()),
            // 304: already started
            Err(BollardError::DockerResponseServerError {
                status_code: 304, ..
            }) => Ok(()),
            Err(e) => Err(classify_error(e, id)),
        }
    }

    async fn stop_container(&self, id: &str, grace_period_secs: i64) -> Result<(), GatewayError> {
        let options = StopContainerOptions {
            t: grace_period_secs,
        };
        match self.docker.stop_container(id, Some(options)).await {
            Ok(()) => Ok(()),
            // 304: already stopped
            Err(BollardError::DockerResponseServerError {
                status_code: 304, ..
            }) => Ok(()),
            Err(e) => Err(classify_error(e, id)),
        }
    }

    async fn ping(&self) -> Result<(), GatewayError> {
        self.docker
            .ping()
            .await
            .map(|_| ())
            .map_err(|e| classify_error(e, "<ping>"))
    }
}

/// Maps a Docker client error onto the gateway taxonomy.
fn classify_error(err: BollardError, id: &str) -> GatewayError {
    match err {
        BollardError::DockerResponseServerError {
            status_code: 404, ..
        } => GatewayError::NotFound(id.to_string()),
        BollardError::DockerResponseServerError {
            status_code,
            message,
        } => GatewayError::Rejected {
            status: status_code,
            message,
        },
        other => GatewayError::Unavailable(other.to_string()),
    }
}

fn to_descriptor(summary: ContainerSummary) -> Option<ContainerDescriptor> {
    let id = summary.id?;

    let mut networks: Vec<_> = summary
        .network_settings
        .and_then(|settings| settings.networks)
        .map(|networks| networks.into_iter().collect())
        .unwrap_or_default();
    networks.sort_by(|a, b| a.0.cmp(&b.0));
    let network_aliases = networks
        .into_iter()
        .flat_map(|(_, endpoint)| endpoint.aliases.unwrap_or_default())
        .collect();

    Some(ContainerDescriptor {
        id,
        names: summary.names.unwrap_or_default(),
        state: RunState::from_docker(summary.state.as_deref().unwrap_or("")),
        status: summary.status.unwrap_or_default(),
        labels: summary.labels.unwrap_or_default(),
        network_aliases,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bollard::models::{ContainerSummaryNetworkSettings, EndpointSettings};
    use std::collections::HashMap;

    fn endpoint(aliases: &[&str]) -> EndpointSettings {
        EndpointSettings {
            aliases: Some(aliases.iter().map(|a| a.to_string()).collect()),
            ..Default::default()
        }
    }

    #[test]
    fn summary_is_flattened_into_descriptor() {
        let mut networks = HashMap::new();
        networks.insert(String::from("proxy"), endpoint(&["app.example.com"]));
        networks.insert(String::from("backend"), endpoint(&["app-db"]));
        let mut labels = HashMap::new();
        labels.insert(String::from("dockershocker.enabled"), String::from("true"));

        let summary = ContainerSummary {
            id: Some(String::from("f00d")),
            names: Some(vec![String::from("/app")]),
            state: Some(String::from("exited")),
            status: Some(String::from("Exited (0) 5 minutes ago")),
            labels: Some(labels),
            network_settings: Some(ContainerSummaryNetworkSettings {
                networks: Some(networks),
                ..Default::default()
            }),
            ..Default::default()
        };

        let descriptor = to_descriptor(summary).unwrap();
        assert_eq!(descriptor.id, "f00d");
        assert_eq!(descriptor.display_name(), "app");
        assert_eq!(descriptor.state, RunState::Stopped);
        assert_eq!(
            descriptor.network_aliases,
            vec![String::from("app-db"), String::from("app.example.com")]
        );
        assert_eq!(descriptor.label("dockershocker.enabled"), Some("true"));
    }

    #[test]
    fn summary_without_id_is_skipped() {
        assert!(to_descriptor(ContainerSummary::default()).is_none());
    }

    #[test]
    fn daemon_errors_are_classified() {
        let missing = BollardError::DockerResponseServerError {
            status_code: 404,
            message: String::from("No such container"),
        };
        assert_eq!(
            classify_error(missing, "f00d"),
            GatewayError::NotFound(String::from("f00d"))
        );

        let conflict = BollardError::DockerResponseServerError {
            status_code: 500,
            message: String::from("driver failed"),
        };
        assert_eq!(
            classify_error(conflict, "f00d"),
            GatewayError::Rejected {
                status: 500,
                message: String::from("driver failed")
            }
        );
    }

    #[tokio::test]
    async fn tcp_endpoint_builds_a_client() {
        let config = DockerConfig {
            socket: String::from("tcp://127.0.0.1:2375"),
            timeout_secs: 5,
        };
        assert!(DockerGateway::connect(&config).is_ok());
    }
}
