mod config;
mod db;
mod error;
mod handlers;
mod models;
mod voting;

use config::Config;
use handlers::AppState;
use log::{error, info};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    // Initialize logging
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };

    let store = match db::connect(&config.backend).await {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to initialize store: {}", e);
            return;
        }
    };
    info!(
        "Using {} store; ranking {} attendees across {} categories",
        store.backend_tag(),
        config.roster.attendees.len(),
        config.roster.categories.len()
    );

    let app = handlers::router(AppState::new(store, config.roster));

    let listener = match TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", config.bind_addr, e);
            return;
        }
    };
    info!("Listening on {}", config.bind_addr);

    if let Err(why) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {:?}", why);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down");
}
