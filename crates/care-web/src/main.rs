//! HTTP API for the animal care tracker.
//!
//! Serves treatment schedules, rosters and the daily board as JSON, backed by
//! Google Sheets and Drive.

mod config;
mod error;
mod routes;
mod state;

use std::sync::Arc;

use care_core::{Session, Settings};
use google_sheets::GoogleWorkspace;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("care_web=info,care_core=info,google_sheets=info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, production = config.production, "Starting care web server");

    let workspace = GoogleWorkspace::new(config.google.clone())?;
    let session = Arc::new(Session::with_workspace(
        workspace,
        Settings::from_env(),
        config.options.clone(),
    ));

    // Warm the configuration; requests retry if this fails
    let warm = session.clone();
    tokio::spawn(async move {
        if let Err(e) = warm.ready().await {
            warn!("Configuration not loaded at startup: {}", e);
        }
    });

    let app = routes::app(AppState::new(session, config.production));

    // Start server
    info!(addr = %config.addr, "Care web server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
