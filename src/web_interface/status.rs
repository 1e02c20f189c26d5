//! Read-only view over managed containers for the dashboard and its JSON twin.

use std::sync::Arc;

use crate::activity::ActivityLedger;
use crate::container_management::{RuntimeGateway, TimeoutPolicy};
use crate::error_handling::types::GatewayError;
use crate::web_interface::types::ContainerStatusResponse;

pub struct StatusBoard {
    gateway: Arc<dyn RuntimeGateway>,
    ledger: Arc<ActivityLedger>,
    policy: TimeoutPolicy,
}

impl StatusBoard {
    pub fn new(
        gateway: Arc<dyn RuntimeGateway>,
        ledger: Arc<ActivityLedger>,
        policy: TimeoutPolicy,
    ) -> Self {
        Self {
            gateway,
            ledger,
            policy,
        }
    }

    /// Running, managed containers with their last access and effective timeout.
    pub async fn snapshot(&self) -> Result<Vec<ContainerStatusResponse>, GatewayError> {
        let containers = self.gateway.list_containers(false).await?;
        Ok(containers
            .iter()
            .filter(|c| self.policy.is_eligible(c))
            .map(|c| ContainerStatusResponse {
                id: c.id.clone(),
                name: c.display_name().to_string(),
                status: c.status.clone(),
                last_access: self.ledger.last_access(&c.id).map(|t| t.to_rfc3339()),
                timeout_minutes: self.policy.resolve(c).as_secs() / 60,
            })
            .collect())
    }

    /// Checks that the runtime answers.
    pub async fn ping(&self) -> Result<(), GatewayError> {
        self.gateway.ping().await
    }
}

pub fn render_html(containers: &[ContainerStatusResponse]) -> String {
    let mut rows = String::new();
    for c in containers {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}m</td></tr>\n",
            escape(&c.name),
            escape(&c.status),
            escape(c.last_access.as_deref().unwrap_or("never")),
            c.timeout_minutes
        ));
    }
    format!(
        r#"<html><head><title>Managed Containers</title></head>
<body><h1>Managed Containers</h1>
<table border="1">
<tr><th>Name</th><th>Status</th><th>Last Access</th><th>Timeout</th></tr>
{}</table></body></html>"#,
        rows
    )
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
