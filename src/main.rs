use clap::Parser;
use log::{error, info};
use lullaby::configuration::config::{Cli, Config};
use lullaby::controller::controller_handler::Controller;

#[tokio::main]
async fn main() {
    // RUST_LOG, when set, wins over the configured level
    let level_from_env = std::env::var_os("RUST_LOG").is_some();
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Trace)
        .parse_default_env()
        .format_target(false)
        .init();
    if !level_from_env {
        log::set_max_level(log::LevelFilter::Info);
    }

    // Get command-line arguments
    let cli = Cli::parse();

    let config = match Config::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("Unable to load configuration: {}, exiting...", e);
            std::process::exit(1);
        }
    };

    if !level_from_env {
        log::set_max_level(config.log_level_filter().unwrap_or(log::LevelFilter::Info));
    }

    info!(
        "Starting lullaby v{} (runtime at {})",
        env!("CARGO_PKG_VERSION"),
        config.docker.socket
    );
    if config.log_level == "debug" {
        info!("Debug logging enabled");
    }

    let controller = match Controller::new(config) {
        Ok(controller) => controller,
        Err(e) => {
            error!(
                "Unable to create a controller instance: {}, exiting...",
                e
            );
            std::process::exit(1);
        }
    };

    if let Err(e) = controller.run().await {
        error!("Error occurred in the controller process: {}, exiting...", e);
        std::process::exit(1);
    }
}
