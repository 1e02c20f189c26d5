//! In-memory [`RuntimeGateway`] used by the sweeper, router and web tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::container_management::gateway::RuntimeGateway;
use crate::container_management::types::{ContainerDescriptor, RunState};
use crate::error_handling::types::GatewayError;

#[derive(Default)]
pub struct MockGateway {
    containers: Mutex<Vec<ContainerDescriptor>>,
    list_unavailable: Mutex<bool>,
    failing_starts: Mutex<HashSet<String>>,
    failing_stops: Mutex<HashSet<String>>,
    pub list_calls: Mutex<Vec<bool>>,
    pub start_calls: Mutex<Vec<String>>,
    pub stop_calls: Mutex<Vec<(String, i64)>>,
}

impl MockGateway {
    pub fn with_containers(containers: Vec<ContainerDescriptor>) -> Self {
        Self {
            containers: Mutex::new(containers),
            ..Default::default()
        }
    }

    pub fn set_list_unavailable(&self, unavailable: bool) {
        *self.list_unavailable.lock().unwrap() = unavailable;
    }

    pub fn fail_start(&self, id: &str) {
        self.failing_starts.lock().unwrap().insert(id.to_string());
    }

    pub fn fail_stop(&self, id: &str) {
        self.failing_stops.lock().unwrap().insert(id.to_string());
    }

    pub fn clear_stop_failures(&self) {
        self.failing_stops.lock().unwrap().clear();
    }

    pub fn state_of(&self, id: &str) -> Option<RunState> {
        self.containers
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.state.clone())
    }

    pub fn started(&self) -> Vec<String> {
        self.start_calls.lock().unwrap().clone()
    }

    pub fn stopped(&self) -> Vec<(String, i64)> {
        self.stop_calls.lock().unwrap().clone()
    }

    fn set_state(&self, id: &str, state: RunState) -> Result<(), GatewayError> {
        let mut containers = self.containers.lock().unwrap();
        match containers.iter_mut().find(|c| c.id == id) {
            Some(container) => {
                container.state = state;
                Ok(())
            }
            None => Err(GatewayError::NotFound(id.to_string())),
        }
    }
}

#[async_trait]
impl RuntimeGateway for MockGateway {
    async fn list_containers(
        &self,
        include_stopped: bool,
    ) -> Result<Vec<ContainerDescriptor>, GatewayError> {
        self.list_calls.lock().unwrap().push(include_stopped);
        if *self.list_unavailable.lock().unwrap() {
            return Err(GatewayError::Unavailable(String::from("connection refused")));
        }
        Ok(self
            .containers
            .lock()
            .unwrap()
            .iter()
            .filter(|c| include_stopped || c.state.is_running())
            .cloned()
            .collect())
    }

    async fn start_container(&self, id: &str) -> Result<(), GatewayError> {
        self.start_calls.lock().unwrap().push(id.to_string());
        if self.failing_starts.lock().unwrap().contains(id) {
            return Err(GatewayError::Rejected {
                status: 500,
                message: String::from("port is already allocated"),
            });
        }
        self.set_state(id, RunState::Running)
    }

    async fn stop_container(&self, id: &str, grace_period_secs: i64) -> Result<(), GatewayError> {
        self.stop_calls
            .lock()
            .unwrap()
            .push((id.to_string(), grace_period_secs));
        if self.failing_stops.lock().unwrap().contains(id) {
            return Err(GatewayError::Unavailable(String::from("stop timed out")));
        }
        self.set_state(id, RunState::Stopped)
    }

    async fn ping(&self) -> Result<(), GatewayError> {
        if *self.list_unavailable.lock().unwrap() {
            return Err(GatewayError::Unavailable(String::from("connection refused")));
        }
        Ok(())
    }
}

/// Builds a container descriptor for tests.
pub fn container(
    id: &str,
    aliases: &[&str],
    state: RunState,
    labels: &[(&str, &str)],
) -> ContainerDescriptor {
    ContainerDescriptor {
        id: id.to_string(),
        names: vec![format!("/{}", id)],
        state,
        status: String::from("Up 1 minute"),
        labels: labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>(),
        network_aliases: aliases.iter().map(|a| a.to_string()).collect(),
    }
}

/// Labels of a container managed with the default timeout.
pub const MANAGED: &[(&str, &str)] = &[("dockershocker.enabled", "true")];
