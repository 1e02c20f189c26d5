use log::{error, info};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

use crate::activity::ActivityLedger;
use crate::admission::AdmissionLimiter;
use crate::configuration::config::Config;
use crate::container_management::{DockerGateway, ManagementLabels, RuntimeGateway, TimeoutPolicy};
use crate::error_handling::types::*;
use crate::lifecycle::{IdleSweeper, WakeRouter};
use crate::web_interface::{StatusBoard, WebServer};

/// Owns every long-lived component and runs them for the lifetime of the process.
///
/// Components are built once here and handed to each other explicitly: the runtime
/// gateway, activity ledger and admission limiter are shared, nothing is global.
pub struct Controller {
    pub config: Config,
    ledger: Arc<ActivityLedger>,
    sweeper: Arc<IdleSweeper>,
    web_server: WebServer,
}

impl Controller {
    /// Connects to the configured Docker endpoint and wires the components.
    pub fn new(config: Config) -> Result<Self, ControllerError> {
        let gateway = DockerGateway::connect(&config.docker).map_err(|e| {
            error!("Error initializing Docker client: {}", e);
            ControllerError::GatewayError(e)
        })?;
        Ok(Self::with_gateway(config, Arc::new(gateway)))
    }

    pub fn with_gateway(config: Config, gateway: Arc<dyn RuntimeGateway>) -> Self {
        let ledger = Arc::new(ActivityLedger::new(config.lifecycle.ledger_shards));
        let labels = ManagementLabels::from_config(&config.lifecycle);
        let policy = TimeoutPolicy::new(labels.clone(), config.default_idle_timeout());
        let limiter = Arc::new(AdmissionLimiter::from_config(&config.admission));

        let sweeper = Arc::new(IdleSweeper::new(
            gateway.clone(),
            ledger.clone(),
            policy.clone(),
            config.sweep_interval(),
            config.sweep_backoff(),
        ));
        let router = Arc::new(WakeRouter::new(gateway.clone(), ledger.clone(), labels));
        let board = Arc::new(StatusBoard::new(gateway, ledger.clone(), policy));
        let web_server = WebServer::new(board, router, limiter);

        Self {
            config,
            ledger,
            sweeper,
            web_server,
        }
    }

    pub fn ledger(&self) -> Arc<ActivityLedger> {
        self.ledger.clone()
    }

    /// Runs until Ctrl-C.
    pub async fn run(&self) -> Result<(), ControllerError> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Unable to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Spawns the idle sweeper, serves HTTP, and winds both down once `shutdown` completes.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<(), ControllerError>
    where
        F: Future<Output = ()>,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let sweeper = self.sweeper.clone();
        let sweep_task = tokio::spawn(async move { sweeper.run(shutdown_rx).await });

        let result = tokio::select! {
            served = self
                .web_server
                .start(&self.config.server.bind_address, self.config.server.port) => {
                served.map_err(ControllerError::from)
            }
            _ = shutdown => {
                info!("Shutdown requested");
                Ok(())
            }
        };

        let _ = shutdown_tx.send(true);
        if let Err(e) = sweep_task.await {
            error!("Idle sweeper task ended abnormally: {}", e);
        }
        info!("Controller stopped");
        result
    }
}
