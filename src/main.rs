use clap::{Parser, Subcommand};
use co_sensor_bridge::bridge::Bridge;
use co_sensor_bridge::config::BridgeConfig;
use co_sensor_bridge::error::BridgeError;
use log::{error, info};
use std::path::PathBuf;
use tokio::signal;

#[derive(Parser)]
#[command(name = "co-sensor-bridge")]
#[command(about = "Expose HTTP-polled CO and smoke sensors as bridge accessories")]
struct Cli {
    /// Path to the accessory config file
    #[arg(long, env = "CO_BRIDGE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll every accessory on its interval until Ctrl+C (default)
    Run,
    /// Read every characteristic once and print the results as JSON
    Read,
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn load_config(path: Option<PathBuf>) -> Result<BridgeConfig, BridgeError> {
    let path = path
        .or_else(BridgeConfig::default_path)
        .ok_or(BridgeError::NoConfigDir)?;
    info!("Loading configuration from {}", path.display());
    BridgeConfig::load(&path)
}

#[tokio::main]
async fn main() {
    init_logger();
    let cli = Cli::parse();

    let config = match load_config(cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let bridge = match Bridge::from_config(&config) {
        Ok(bridge) => bridge,
        Err(e) => {
            error!("Failed to set up bridge: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Read => {
            let reports = bridge.read_all().await;
            match serde_json::to_string_pretty(&reports) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    error!("Failed to encode readings: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Run => {
            info!("Starting CO sensor bridge");
            let pollers = bridge.start();
            info!(
                "CO sensor bridge is running with {} accessory(ies)",
                pollers.len()
            );
            info!("  - Press Ctrl+C to exit");

            match signal::ctrl_c().await {
                Ok(()) => info!("Received shutdown signal"),
                Err(e) => error!("Failed to listen for shutdown signal: {}", e),
            }

            for poller in pollers {
                poller.abort();
            }

            match serde_json::to_string_pretty(&bridge.store().snapshot()) {
                Ok(json) => info!("Last reported values:\n{json}"),
                Err(e) => error!("Failed to encode last reported values: {}", e),
            }
            info!("CO sensor bridge stopped");
        }
    }
}
