//! WebSocket upgrade handlers for room and global connections.
//!
//! Handles the HTTP → WebSocket upgrade and the connection lifecycle:
//! 1. Validate the room id (room routes only)
//! 2. Upgrade to WebSocket
//! 3. Resolve the hub and register a new client with it
//! 4. Pump frames until either side disconnects
//! 5. Unregister from the hub

use std::sync::Arc;

use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use futures::StreamExt;

use super::client::Client;
use crate::adapters::http::dto::ErrorResponse;
use crate::adapters::hub::{GlobalHub, HubManager};
use crate::domain::foundation::RoomId;
use crate::ports::Hub;

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    /// Room hub lookup, shared with the reaper.
    pub hub_manager: Arc<HubManager>,
}

impl WebSocketState {
    /// Create a new WebSocket state.
    pub fn new(hub_manager: Arc<HubManager>) -> Self {
        Self { hub_manager }
    }
}

/// Handle WebSocket upgrade requests for a chat room.
///
/// Route: `GET /ws/rooms/:room_id`
///
/// The room id is validated before the upgrade, so a bad id gets a 400
/// even when the upgrade headers are also missing.
pub async fn room_ws_handler(
    Path(room_id): Path<String>,
    State(state): State<WebSocketState>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let room_id = match RoomId::new(room_id) {
        Ok(id) => id,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected WebSocket upgrade with invalid room id");
            return bad_request(e.to_string());
        }
    };

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return rejection.into_response(),
    };

    ws.on_upgrade(move |socket| async move {
        let hub = state.hub_manager.get_or_create(room_id).await;
        let queue_capacity = state.hub_manager.config().client_queue_capacity;
        handle_socket(socket, hub, queue_capacity).await;
    })
}

/// Route: `GET /ws/rooms/`
pub async fn missing_room_handler() -> Response {
    bad_request("Room id is required")
}

/// Handle WebSocket upgrade requests for the global feed.
///
/// Route: `GET /ws/global`
pub async fn global_ws_handler(
    State(state): State<WebSocketState>,
    ws: WebSocketUpgrade,
) -> Response {
    let queue_capacity = state.hub_manager.config().client_queue_capacity;
    ws.on_upgrade(move |socket| async move {
        handle_socket(socket, GlobalHub::instance(), queue_capacity).await;
    })
}

/// Handle an established WebSocket connection.
///
/// Runs for the lifetime of the connection.
async fn handle_socket(socket: WebSocket, hub: Arc<dyn Hub>, queue_capacity: usize) {
    let client = Client::new(Arc::clone(&hub), queue_capacity);
    hub.register(client.handle()).await;

    tracing::info!(client_id = %client.id(), hub = hub.name(), "Client connected");

    let (writer, reader) = socket.split();
    client.serve(writer, reader).await;
}

fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::bad_request(message)),
    )
        .into_response()
}

/// Create axum router for the WebSocket endpoints.
///
/// # Example
///
/// ```ignore
/// let app = Router::new()
///     .merge(websocket_router())
///     .with_state(WebSocketState::new(hub_manager));
/// ```
pub fn websocket_router() -> Router<WebSocketState> {
    Router::new()
        .route("/ws/rooms/:room_id", get(room_ws_handler))
        .route("/ws/rooms/", get(missing_room_handler))
        .route("/ws/global", get(global_ws_handler))
}
