// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::chart_service::ChartService;
use crate::application::streaming_service::StreamingChartService;
use crate::infrastructure::backend_repository::BackendRepository;
use crate::infrastructure::config::load_config;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    close_view, decode_payload, get_chart_records, get_chart_series, get_view, health_check,
    query_records_table, start_view_load, stream_chart,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_config()?;
    let policy = config.decode.policy();

    // Create repository (infrastructure layer)
    let repository = Arc::new(BackendRepository::new(
        config.backend.base_url.clone(),
        config.backend.chart_path.clone(),
        Duration::from_secs(config.backend.timeout_secs),
    )?);

    // Create services (application layer)
    let chart_service = ChartService::new(repository.clone(), policy);
    let streaming_service = StreamingChartService::new(repository, policy);

    // Create application state
    let state = Arc::new(AppState {
        chart_service,
        streaming_service,
        default_policy: policy,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/charts/:kind/:option", get(get_chart_records))
        .route("/charts/:kind/:option/series", get(get_chart_series))
        .route("/charts/:kind/:option/stream", get(stream_chart))
        .route("/decode", post(decode_payload))
        .route("/table", post(query_records_table))
        .route(
            "/views/:view",
            get(get_view).post(start_view_load).delete(close_view),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid server bind address '{}'", config.server.bind))?;
    tracing::info!(
        "Starting genome-compression-dashboard on {} (backend {}, {:?} decoding)",
        addr,
        config.backend.base_url,
        policy
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
