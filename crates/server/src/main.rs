use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;

use app_state::AppState;
use config::{load_settings, prepare_upload_dirs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings();
    let dirs = prepare_upload_dirs(&settings.upload_root)?;
    let addr: SocketAddr = settings.bind_addr.parse()?;
    let state = AppState {
        settings: Arc::new(settings),
        dirs,
    };
    let app = build_router(state);

    info!(%addr, "upload server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: AppState) -> Router {
    let max_body_bytes = state.settings.max_body_bytes;
    Router::new()
        .route("/healthz", get(healthz))
        .route("/upload/", post(api::upload))
        .route("/upload_calibration/", post(api::upload_calibration))
        .route("/upload_params/", post(api::upload_params))
        .route("/upload_and_process/", post(api::upload_and_process))
        .route("/upload_model/", post(api::upload_model))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
