use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod db;
mod models;
mod services;
mod utils;

use api::paylink::PaylinkClient;
use config::SyncConfig;
use services::scheduler::SyncScheduler;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("paysync=info")),
        )
        .with_target(true)
        .init();

    info!("Starting paysync v{}", env!("CARGO_PKG_VERSION"));

    let cfg = match SyncConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Initialize store
    info!("Connecting to store {}.{}...", cfg.database_name, cfg.collection_name);
    let store = match db::init_store(&cfg).await {
        Ok(store) => {
            info!("Store connected successfully");
            store
        }
        Err(e) => {
            error!("Failed to connect to store: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let client = match PaylinkClient::new(&cfg) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create API client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let scheduler = SyncScheduler::new(client, store, &cfg);

    if cfg.run_once {
        info!("Fetching new transactions (single pass)...");
        return match scheduler.run_once().await {
            Ok(_) => ExitCode::SUCCESS,
            Err(_) => ExitCode::FAILURE,
        };
    }

    let cancel_token = scheduler.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested, stopping after the current step");
            cancel_token.cancel();
        }
    });

    info!("Fetching new transactions...");
    match scheduler.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Sync terminated: {}", e);
            ExitCode::FAILURE
        }
    }
}
