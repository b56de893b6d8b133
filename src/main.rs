// main.rs
mod auth;
mod config;
mod database;
mod error;
mod formatter;
mod handlers;
mod models;
mod pdf;
mod process;
mod routes;
mod utils;
mod views;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::database::setup_database;
use crate::handlers::AppState;
use crate::routes::setup_router;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

const DEFAULT_LOG_FILTER: &str = "webui_utils=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::from_env();
    let addr = config.server_addr();

    // Initialize database connection
    let database = setup_database(&config.database_url).await?;

    let state = AppState::new(config, database).await;
    let app = setup_router(state);

    info!("Listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
