//! condotel-server — vacation-rental booking platform core
//!
//! Long-running service that:
//! - Manages the booking lifecycle (create/update/cancel, no double-booking)
//! - Reconciles payment provider callbacks (webhook + return-url)
//! - Runs the refund workflow and the host payout scheduler

mod api;
mod auth;
mod booking;
mod config;
mod db;
mod email;
mod error;
mod payment;
mod payos;
mod payout;
mod refund;
mod state;
mod util;

use config::Config;
use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "condotel_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting condotel-server (env: {})", config.environment);

    let state = AppState::new(&config).await?;

    // Periodic payout sweep
    let sweep_state = state.clone();
    let sweep_interval = std::time::Duration::from_secs(config.payout_sweep_hours * 3600);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval);
        // The immediate first tick would sweep at every restart
        interval.tick().await;
        loop {
            interval.tick().await;
            if let Err(e) = payout::run_batch(&sweep_state).await {
                tracing::error!(code = ?e.code(), "Payout sweep failed");
            }
        }
    });

    let app = api::create_router(state);

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("condotel-server HTTP listening on {http_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
