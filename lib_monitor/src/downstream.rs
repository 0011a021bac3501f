//! # Query Protocol Server
//!
//! Serves snapshot queries to remote consumers over WebSocket. Each
//! connection gets its own task; a request frame is answered by streaming
//! one response frame per (player, statistic) pair, generated from a single
//! store snapshot so the reply is internally consistent.
//!
//! Binding is retried forever: a port held by a dying predecessor or a not
//! yet configured interface only delays the endpoint, it never kills the
//! process. Only the stop signal ends the retry loop.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures_util::StreamExt;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::catalog;
use crate::protocol;
use crate::store::RecordStore;

/// Shared state for the router's handlers.
#[derive(Clone)]
pub struct QueryState {
    pub store: RecordStore,
    pub shutdown: broadcast::Sender<()>,
}

/// The server's routes: the query WebSocket plus a plain health check.
pub fn router(state: QueryState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

pub async fn run(
    addr: SocketAddr,
    retry_interval: Duration,
    store: RecordStore,
    shutdown: broadcast::Sender<()>,
) {
    loop {
        match TcpListener::bind(addr).await {
            Ok(listener) => {
                log::info!("Query server listening on {}", addr);
                match serve(listener, store.clone(), shutdown.clone()).await {
                    Ok(()) => return,
                    Err(err) => {
                        log::error!("Query server transport failure: {}", err);
                    }
                }
            }
            Err(err) => {
                log::error!("Failed to bind query server on {}: {}", addr, err);
            }
        }

        log::error!("Retrying in {:?}...", retry_interval);
        let mut stop = shutdown.subscribe();
        tokio::select! {
            _ = stop.recv() => return,
            _ = tokio::time::sleep(retry_interval) => {}
        }
    }
}

/// Serves query connections on an already-bound listener until the stop
/// signal fires. `Ok` means a clean stop; transport errors bubble up to the
/// caller's retry loop.
pub async fn serve(
    listener: TcpListener,
    store: RecordStore,
    shutdown: broadcast::Sender<()>,
) -> std::io::Result<()> {
    let mut stop = shutdown.subscribe();
    let app = router(QueryState { store, shutdown });
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            stop.recv().await.ok();
            log::info!("Query server shutting down.");
        })
        .await
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<QueryState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn health_handler() -> impl IntoResponse {
    (axum::http::StatusCode::OK, "OK")
}

async fn handle_socket(mut socket: WebSocket, state: QueryState) {
    let mut shutdown = state.shutdown.subscribe();
    let mut last_activity = std::time::Instant::now();
    log::info!("Query client connected");

    loop {
        tokio::select! {
            // Stop signal: close abruptly, no draining.
            _ = shutdown.recv() => {
                let _ = socket.send(Message::Close(None)).await;
                break;
            }
            msg = socket.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        last_activity = std::time::Instant::now();
                        let request = match protocol::decode_request(&text) {
                            Ok(request) => request,
                            Err(err) => {
                                log::warn!("Malformed request frame, closing connection: {}", err);
                                break;
                            }
                        };
                        if !stream_response(&mut socket, &state.store, &request).await {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    // Pings are answered by axum itself; binary frames carry
                    // nothing we understand.
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        log::warn!("Query connection error: {}", err);
                        break;
                    }
                }
            }
        }
    }

    log::info!(
        "Query client disconnected (idle for {:?})",
        last_activity.elapsed()
    );
}

/// Streams the full response for one request. Returns `false` when the
/// connection is no longer usable.
async fn stream_response(socket: &mut WebSocket, store: &RecordStore, request: &protocol::RequestFrame) -> bool {
    // One snapshot and one clock reading per request: every frame of this
    // response describes the same instant.
    let hour = protocol::current_rounded_hour();
    let frames = protocol::respond(request, &store.snapshot(), catalog::all(), hour);
    log::debug!(
        "Answering request {} ('{}') with {} frames",
        request.id,
        request.instruction,
        frames.len()
    );

    for frame in frames {
        let payload = match serde_json::to_string(&frame) {
            Ok(payload) => payload,
            Err(err) => {
                log::error!("Failed to encode response frame: {}", err);
                return false;
            }
        };
        if socket.send(Message::Text(payload.into())).await.is_err() {
            return false;
        }
    }
    true
}
