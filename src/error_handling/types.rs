use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    NotInRange(String),
    InvalidValue(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::NotInRange(e) => write!(f, "Value out of range: {}", e),
            ConfigError::InvalidValue(e) => write!(f, "Invalid value: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

/// Failures reported by the container runtime API.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// Transport failure, the runtime API could not be reached.
    Unavailable(String),
    /// The container vanished between listing and acting on it.
    NotFound(String),
    /// The runtime answered but refused the operation.
    Rejected { status: u16, message: String },
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Unavailable(e) => write!(f, "Container runtime unavailable: {}", e),
            GatewayError::NotFound(id) => write!(f, "Container not found: {}", id),
            GatewayError::Rejected { status, message } => {
                write!(f, "Container runtime rejected request ({}): {}", status, message)
            }
        }
    }
}

impl std::error::Error for GatewayError {}

/// Failures of a single wake request. None of them mutate the activity ledger.
#[derive(Debug, Clone, PartialEq)]
pub enum WakeError {
    RateLimited,
    MissingHost,
    NotFound(String),
    GatewayUnavailable(GatewayError),
    StartFailed { container_id: String, reason: String },
}

impl WakeError {
    /// HTTP status surfaced to the client for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            WakeError::RateLimited => 429,
            WakeError::MissingHost => 400,
            WakeError::NotFound(_) => 404,
            WakeError::GatewayUnavailable(_) => 503,
            WakeError::StartFailed { .. } => 500,
        }
    }
}

impl fmt::Display for WakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WakeError::RateLimited => write!(f, "Too many requests"),
            WakeError::MissingHost => write!(f, "Request carries no Host header"),
            WakeError::NotFound(host) => {
                write!(f, "No container matched the requested host {}", host)
            }
            WakeError::GatewayUnavailable(e) => write!(f, "Error fetching containers: {}", e),
            WakeError::StartFailed {
                container_id,
                reason,
            } => write!(f, "Error starting container {}: {}", container_id, reason),
        }
    }
}

impl std::error::Error for WakeError {}

#[derive(Debug)]
pub enum WebError {
    BindFailed(String),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::BindFailed(e) => write!(f, "Web server bind failed: {}", e),
        }
    }
}

impl std::error::Error for WebError {}

#[derive(Debug)]
pub enum ControllerError {
    ConfigurationError(ConfigError),
    GatewayError(GatewayError),
    WebError(WebError),
    InitializationFailed(String),
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::ConfigurationError(e) => write!(f, "Configuration error: {}", e),
            ControllerError::GatewayError(e) => write!(f, "Gateway error: {}", e),
            ControllerError::WebError(e) => write!(f, "Web error: {}", e),
            ControllerError::InitializationFailed(e) => write!(f, "Initialization failed: {}", e),
        }
    }
}

impl std::error::Error for ControllerError {}

impl From<ConfigError> for ControllerError {
    fn from(err: ConfigError) -> Self {
        ControllerError::ConfigurationError(err)
    }
}

impl From<WebError> for ControllerError {
    fn from(err: WebError) -> Self {
        ControllerError::WebError(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wake_errors_map_to_http_statuses() {
        assert_eq!(WakeError::RateLimited.status_code(), 429);
        assert_eq!(WakeError::MissingHost.status_code(), 400);
        assert_eq!(WakeError::NotFound("a.local".into()).status_code(), 404);
        assert_eq!(
            WakeError::GatewayUnavailable(GatewayError::Unavailable("refused".into()))
                .status_code(),
            503
        );
        assert_eq!(
            WakeError::StartFailed {
                container_id: "abc".into(),
                reason: "boom".into()
            }
            .status_code(),
            500
        );
    }

    #[test]
    fn start_failure_message_carries_detail() {
        let err = WakeError::StartFailed {
            container_id: "abc".into(),
            reason: "port already allocated".into(),
        };
        assert_eq!(
            err.to_string(),
            "Error starting container abc: port already allocated"
        );
    }
}
