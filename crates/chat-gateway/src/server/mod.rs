//! Gateway server setup
//!
//! Wires the WebSocket route, the bus subscriber, and the broadcast listener,
//! and owns the process shutdown sequence.

mod handler;
mod state;

pub use handler::{authenticate, gateway_handler, ConnectParams, SessionIdentity};
pub use state::GatewayState;

use axum::{extract::State, routing::get, Json, Router};
use chat_cache::SubscriberBuilder;
use chat_common::{AppConfig, AppError, JwtService};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Create the gateway router
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/ws", get(gateway_handler))
        .route("/health", get(health_check))
}

/// Health check endpoint
async fn health_check(State(state): State<GatewayState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "connections": state.registry().len(),
        "listener_running": state.listener().is_running(),
    }))
}

/// Build the complete application
pub fn create_app(state: GatewayState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize all dependencies, start the broadcast listener, and create
/// `GatewayState`
pub async fn create_gateway_state(config: &AppConfig) -> Result<GatewayState, AppError> {
    let infra = chat_service::connect(config).await?;

    tracing::info!("Subscribing to event bus...");
    let subscriber = SubscriberBuilder::new()
        .redis_url(config.redis.url.clone())
        .broadcast_buffer(config.chat.bus_broadcast_buffer)
        .reconnect_delay_ms(config.chat.bus_reconnect_delay_ms)
        .subscribe_all_topics()
        .build()
        .await
        .map_err(|e| AppError::Cache(format!("Failed to subscribe to event bus: {e}")))?;
    tracing::info!("Event bus subscription established");

    let jwt = JwtService::new(&config.jwt.secret, config.jwt.token_expiry);

    let state = GatewayState::new(infra.context, jwt)
        .with_outbound_buffer(config.chat.outbound_buffer)
        .with_subscriber(subscriber);

    if let Some(subscriber) = state.subscriber() {
        state.listener().start(subscriber.receiver());
    }

    Ok(state)
}

/// Run the gateway until ctrl-c, then stop the listener and close sessions
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.gateway.address();
    let state = create_gateway_state(&config).await?;
    let app = create_app(state.clone());

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Gateway listening on ws://{}/ws", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state.clone()))
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")));

    state.shutdown().await;
    served
}

/// Resolve on ctrl-c and close live sessions so their upgrades can finish
async fn shutdown_signal(state: GatewayState) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install ctrl-c handler");
        return;
    }

    tracing::info!("Shutdown signal received");
    state.registry().close_all();
}
