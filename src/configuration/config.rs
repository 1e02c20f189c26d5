use super::types::*;
use crate::error_handling::types::ConfigError;
use clap::Parser;
use log::{debug, LevelFilter};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Command-line surface of the binary.
///
/// Every flag is optional: when present it overrides the value loaded from the
/// configuration file (or the built-in default when no file is given). Each flag can also be
/// set through the matching `LULLABY_*` environment variable.
///
/// # Command Line
/// ```text
/// lullaby --config /etc/lullaby.toml --port 8080 --log-level debug \
///         --docker-socket unix:///var/run/docker.sock
/// ```
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "lullaby")]
#[command(version)]
#[command(about = "Starts containers on demand and stops them once they go idle")]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, env = "LULLABY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port to listen on
    #[arg(long, env = "LULLABY_PORT")]
    pub port: Option<u16>,

    /// Address to bind the HTTP server to
    #[arg(long, env = "LULLABY_BIND_ADDRESS")]
    pub bind_address: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, env = "LULLABY_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Container runtime endpoint (unix://path or tcp://host:port)
    #[arg(long, env = "LULLABY_DOCKER_SOCKET")]
    pub docker_socket: Option<String>,
}

/// Application configuration holding every runtime parameter.
///
/// # Fields Overview
///
/// - `log_level`: verbosity handed to `env_logger`
/// - `server`: where the wake trigger, status listing and health probe are served
/// - `docker`: how to reach the container runtime API
/// - `lifecycle`: idle timeout default, sweep cadence and label names
/// - `admission`: token bucket rate and burst for inbound requests
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub server: ServerConfig,
    pub docker: DockerConfig,
    pub lifecycle: LifecycleConfig,
    pub admission: AdmissionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: String::from("info"),
            server: ServerConfig::default(),
            docker: DockerConfig::default(),
            lifecycle: LifecycleConfig::default(),
            admission: AdmissionConfig::default(),
        }
    }
}

impl Config {
    /// Reads a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!("Reading configuration from {}", path.display());
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::TomlError(e.to_string()))
    }

    /// Builds the effective configuration: file (if any), then CLI overrides, then validation.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(cli);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(address) = &cli.bind_address {
            self.server.bind_address = address.clone();
        }
        if let Some(level) = &cli.log_level {
            self.log_level = level.clone();
        }
        if let Some(socket) = &cli.docker_socket {
            self.docker.socket = socket.clone();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::NotInRange(String::from(
                "server.port must be between 1 and 65535",
            )));
        }
        if self.server.bind_address.parse::<std::net::IpAddr>().is_err() {
            return Err(ConfigError::InvalidValue(format!(
                "server.bind_address is not an IP address: {}",
                self.server.bind_address
            )));
        }
        if self.lifecycle.default_idle_timeout_minutes == 0 {
            return Err(ConfigError::NotInRange(String::from(
                "lifecycle.default_idle_timeout_minutes must be positive",
            )));
        }
        if self.lifecycle.sweep_interval_secs == 0 {
            return Err(ConfigError::NotInRange(String::from(
                "lifecycle.sweep_interval_secs must be positive",
            )));
        }
        if self.lifecycle.ledger_shards == 0 {
            return Err(ConfigError::NotInRange(String::from(
                "lifecycle.ledger_shards must be positive",
            )));
        }
        if self.lifecycle.enabled_label.trim().is_empty()
            || self.lifecycle.timeout_label.trim().is_empty()
        {
            return Err(ConfigError::InvalidValue(String::from(
                "lifecycle label keys must not be empty",
            )));
        }
        if !self.admission.rate_per_second.is_finite() || self.admission.rate_per_second <= 0.0 {
            return Err(ConfigError::NotInRange(String::from(
                "admission.rate_per_second must be a positive number",
            )));
        }
        if self.admission.burst == 0 {
            return Err(ConfigError::NotInRange(String::from(
                "admission.burst must be positive",
            )));
        }
        self.log_level_filter()?;
        let socket = self.docker.socket.as_str();
        if !(socket.starts_with("unix://")
            || socket.starts_with("tcp://")
            || socket.starts_with("http://"))
        {
            return Err(ConfigError::InvalidValue(format!(
                "docker.socket has an unsupported scheme: {}",
                socket
            )));
        }
        Ok(())
    }

    pub fn log_level_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .parse::<LevelFilter>()
            .map_err(|_| ConfigError::InvalidValue(format!("unknown log level: {}", self.log_level)))
    }

    pub fn default_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.lifecycle.default_idle_timeout_minutes.saturating_mul(60))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.lifecycle.sweep_interval_secs)
    }

    pub fn sweep_backoff(&self) -> Duration {
        Duration::from_secs(self.lifecycle.sweep_backoff_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn cli_under_test(args: &[&str]) -> Result<Cli, clap::Error> {
        let mut argv = vec!["lullaby"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv)
    }

    #[test]
    #[serial]
    fn defaults_match_documented_values() {
        let config = Config::load(&Cli::default()).unwrap();

        assert_eq!(config.log_level, "info");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.docker.socket, "tcp://dockerproxy:2375");
        assert_eq!(config.default_idle_timeout(), Duration::from_secs(15 * 60));
        assert_eq!(config.sweep_interval(), Duration::from_secs(60));
        assert_eq!(config.sweep_backoff(), Duration::from_secs(2));
        assert_eq!(config.lifecycle.enabled_label, "dockershocker.enabled");
        assert_eq!(config.lifecycle.timeout_label, "dockershocker.timeout_minutes");
        assert_eq!(config.admission.rate_per_second, 5.0);
        assert_eq!(config.admission.burst, 10);
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
log_level = "debug"

[lifecycle]
default_idle_timeout_minutes = 30

[admission]
burst = 3
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.lifecycle.default_idle_timeout_minutes, 30);
        assert_eq!(config.lifecycle.sweep_interval_secs, 60);
        assert_eq!(config.admission.burst, 3);
        assert_eq!(config.admission.rate_per_second, 5.0);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    #[serial]
    fn cli_flags_override_file_values() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 9000\n").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let cli = cli_under_test(&[
            "--config",
            &path,
            "--port",
            "9100",
            "--log-level",
            "warn",
            "--docker-socket",
            "unix:///var/run/docker.sock",
        ])
        .unwrap_or_else(|e| panic!("{}", e));

        let config = Config::load(&cli).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.docker.socket, "unix:///var/run/docker.sock");
    }

    #[test]
    #[serial]
    fn environment_variables_feed_flags() {
        std::env::set_var("LULLABY_PORT", "9200");
        let cli = cli_under_test(&[]);
        std::env::remove_var("LULLABY_PORT");

        assert_eq!(cli.unwrap().port, Some(9200));
    }

    #[test]
    fn malformed_toml_is_reported() {
        let err = Config::from_toml("[server\nport = ").unwrap_err();
        assert!(matches!(err, ConfigError::TomlError(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Config::from_file(Path::new("/nonexistent/lullaby.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }

    #[test]
    fn validation_rejects_out_of_range_values() {
        let mut config = Config::default();
        config.validate().unwrap();

        config.lifecycle.sweep_interval_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::NotInRange(_))));

        let mut config = Config::default();
        config.admission.rate_per_second = f64::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::NotInRange(_))));

        let mut config = Config::default();
        config.server.port = 0;
        assert!(matches!(config.validate(), Err(ConfigError::NotInRange(_))));
    }

    #[test]
    fn huge_default_timeout_saturates() {
        let mut config = Config::default();
        config.lifecycle.default_idle_timeout_minutes = u64::MAX;
        config.validate().unwrap();
        assert_eq!(config.default_idle_timeout(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn validation_rejects_bad_strings() {
        let mut config = Config::default();
        config.log_level = String::from("chatty");
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));

        let mut config = Config::default();
        config.docker.socket = String::from("ftp://docker");
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));

        let mut config = Config::default();
        config.lifecycle.enabled_label = String::from("  ");
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }
}
