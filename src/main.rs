// Main entry point - Dependency injection, refresh loop and server setup
mod application;
mod domain;
mod error;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use axum::{routing::{get, post}, Router};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::refresh_scheduler::RefreshScheduler;
use crate::application::series_builder::SeriesBuilder;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::http_source::HttpTelemetrySource;
use crate::presentation::app_state::AppState;
use crate::presentation::dashboard_store::DashboardStore;
use crate::presentation::handlers::{
    chart_series, current_values, health_check, metric_series, refresh_status, trigger_refresh,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_dashboard_config()?;

    // Backend feeds (infrastructure layer)
    let source = Arc::new(HttpTelemetrySource::new(&config.source)?);

    // Rendering target (presentation layer)
    let store = Arc::new(DashboardStore::new(config.display_targets()?));

    // Refresh loop (application layer)
    let builder = SeriesBuilder::new(config.label_zone()?, config.derive_missing);
    let scheduler = Arc::new(RefreshScheduler::new(
        source,
        store.clone(),
        store.clone(),
        builder,
        config.refresh.fetch_on_start,
    ));
    scheduler.start(config.refresh.interval())?;

    let state = Arc::new(AppState {
        store,
        scheduler: scheduler.clone(),
    });

    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/api/dashboard/current", get(current_values))
        .route("/api/dashboard/series", get(chart_series))
        .route("/api/dashboard/series/:metric", get(metric_series))
        .route("/api/dashboard/status", get(refresh_status))
        .route("/api/dashboard/refresh", post(trigger_refresh))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!(
        "Starting wx-dashboard on {} (polling {})",
        addr,
        config.source.base_url
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.stop();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
