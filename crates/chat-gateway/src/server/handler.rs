//! WebSocket handler
//!
//! Authenticates the upgrade request, registers the session, and runs its
//! read loop. A writer task drains the session's outbound queue into the
//! socket.

use crate::connection::{Connection, OutboundFrame};
use crate::handlers::FrameDispatcher;
use crate::server::GatewayState;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chat_common::{AppError, ErrorResponse};
use chat_core::UserId;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Query string of the upgrade request
#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    pub token: Option<String>,
}

/// Identity resolved from the connection token
#[derive(Debug, Clone)]
pub struct SessionIdentity {
    pub user_id: UserId,
    pub username: String,
}

/// WebSocket gateway handler (`GET /ws?token=`)
///
/// Rejects with 401 before upgrading when the token is missing or invalid.
pub async fn gateway_handler(
    State(state): State<GatewayState>,
    Query(params): Query<ConnectParams>,
    ws: WebSocketUpgrade,
) -> Response {
    let identity = match authenticate(&state, params.token.as_deref()) {
        Ok(identity) => identity,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected gateway connection");
            let body = serde_json::json!({ "error": ErrorResponse::from(e) });
            return (StatusCode::UNAUTHORIZED, Json(body)).into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(state, socket, identity))
}

/// Validate the connection token
pub fn authenticate(state: &GatewayState, token: Option<&str>) -> Result<SessionIdentity, AppError> {
    let token = token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::MissingAuth)?;

    let claims = state.jwt().validate_token(token)?;
    Ok(SessionIdentity {
        user_id: claims.user_id()?,
        username: claims.username,
    })
}

/// Handle an upgraded WebSocket connection
async fn handle_socket(state: GatewayState, socket: WebSocket, identity: SessionIdentity) {
    let session_id = uuid::Uuid::new_v4().to_string();
    let (tx, rx) = mpsc::channel::<OutboundFrame>(state.outbound_buffer());
    let connection = Connection::new(session_id.clone(), identity.user_id, identity.username, tx);

    state.registry().add(connection.clone());

    tracing::info!(
        session_id = %session_id,
        user_id = %identity.user_id,
        "WebSocket connection established"
    );

    let (ws_sink, ws_stream) = socket.split();
    let mut send_task = tokio::spawn(write_loop(
        ws_sink,
        rx,
        connection.close_signal(),
        session_id.clone(),
    ));

    let writer_finished = tokio::select! {
        () = read_loop(&state, &connection, ws_stream) => false,
        _ = &mut send_task => {
            tracing::debug!(session_id = %session_id, "Send task ended");
            true
        }
    };

    cleanup_connection(&state, &connection);

    if !writer_finished {
        if let Err(e) = send_task.await {
            tracing::warn!(session_id = %session_id, error = %e, "Send task failed");
        }
    }
}

/// Read client frames until the socket closes or errors
async fn read_loop(state: &GatewayState, connection: &Connection, mut stream: SplitStream<WebSocket>) {
    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Text(text)) => {
                if let Err(e) = FrameDispatcher::dispatch_text(state, connection, &text).await {
                    if e.is_client_error() {
                        tracing::debug!(
                            session_id = %connection.session_id(),
                            error = %e,
                            "Rejected client frame"
                        );
                    } else {
                        tracing::warn!(
                            session_id = %connection.session_id(),
                            error = %e,
                            "Handler error"
                        );
                    }
                }
            }
            Ok(Message::Binary(_)) => {
                tracing::debug!(
                    session_id = %connection.session_id(),
                    "Ignoring binary frame"
                );
            }
            Ok(Message::Ping(_) | Message::Pong(_)) => {
                // Pong replies are handled by axum
            }
            Ok(Message::Close(_)) => {
                tracing::info!(session_id = %connection.session_id(), "Client closed connection");
                break;
            }
            Err(e) => {
                tracing::warn!(
                    session_id = %connection.session_id(),
                    error = %e,
                    "WebSocket error"
                );
                break;
            }
        }
    }
}

/// Drain the outbound queue into the socket until closed
async fn write_loop(
    mut sink: SplitSink<WebSocket, Message>,
    mut outbound: mpsc::Receiver<OutboundFrame>,
    mut closed: watch::Receiver<bool>,
    session_id: String,
) {
    loop {
        tokio::select! {
            frame = outbound.recv() => {
                let Some(frame) = frame else { break };
                if sink.send(Message::Text(frame.to_string())).await.is_err() {
                    tracing::warn!(session_id = %session_id, "Failed to send message to WebSocket");
                    return;
                }
            }
            _ = closed.changed() => break,
        }
    }

    if let Err(e) = sink.send(Message::Close(None)).await {
        tracing::trace!(session_id = %session_id, error = %e, "Close frame not delivered");
    }
    let _ = sink.close().await;
}

/// Remove the session unless a newer one has replaced it
fn cleanup_connection(state: &GatewayState, connection: &Arc<Connection>) {
    tracing::info!(session_id = %connection.session_id(), "Cleaning up connection");

    state
        .registry()
        .remove_session(connection.user_id(), connection.session_id());

    // A replaced session is no longer in the registry; close it directly
    connection.close();
}
