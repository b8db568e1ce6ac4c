mod api;
mod config;
mod dispatch;
mod error;
mod geo;
mod lifecycle;
mod models;
mod observability;
mod state;
mod wallet;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::dispatch::notify::LogNotifier;

#[tokio::main]
async fn main() -> Result<(), error::AppError> {
    let config = config::Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false)
        .compact()
        .init();

    let notifier = Arc::new(LogNotifier::new(config.push.clone()));
    let (app_state, booking_rx) = state::AppState::new(
        config.dispatch_queue_size,
        config.event_buffer_size,
        config.dispatch_settings(),
        notifier,
    );
    let shared_state = Arc::new(app_state);

    let app = api::rest::router(shared_state.clone());

    tokio::spawn(dispatch::engine::run_dispatch_engine(
        shared_state.clone(),
        booking_rx,
    ));

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| error::AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(http_port = config.http_port, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| error::AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
