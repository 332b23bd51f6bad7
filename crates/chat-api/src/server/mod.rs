//! Server setup and initialization
//!
//! Provides the main application builder and server runner.

use axum::Router;
use chat_common::{AppConfig, AppError, JwtService};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::apply_middleware;
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState, config: &AppConfig) -> Router {
    let api = apply_middleware(
        create_router(),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    );

    api.merge(health_routes().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Connect to every backing service and create `AppState`
pub async fn create_app_state(config: &AppConfig) -> Result<AppState, AppError> {
    let infra = chat_service::connect(config).await?;
    let jwt = JwtService::new(&config.jwt.secret, config.jwt.token_expiry);
    Ok(AppState::from_infrastructure(infra, jwt))
}

/// Serve `app` on `addr` until ctrl-c
pub async fn run_server(app: Router, addr: &str) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let state = create_app_state(&config).await?;
    let app = create_app(state, &config);
    run_server(app, &config.api.address()).await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => tracing::error!(error = %e, "Failed to install ctrl-c handler"),
    }
}
