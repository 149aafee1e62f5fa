//! Health and monitoring endpoints.

use axum::{extract::State, routing::get, Json, Router};

use super::dto::{HelloResponse, RoomSummary, RoomsResponse};
use crate::adapters::hub::GlobalHub;
use crate::adapters::websocket::WebSocketState;
use crate::ports::Hub;

/// `GET /api/hello`
pub async fn hello() -> Json<HelloResponse> {
    Json(HelloResponse {
        message: "hello".to_string(),
    })
}

/// `GET /api/rooms` - live rooms with their client counts.
pub async fn list_rooms(State(state): State<WebSocketState>) -> Json<RoomsResponse> {
    let rooms = state
        .hub_manager
        .room_stats()
        .await
        .into_iter()
        .map(|(room_id, clients)| RoomSummary {
            room_id: room_id.to_string(),
            clients,
        })
        .collect();

    Json(RoomsResponse {
        rooms,
        global_clients: GlobalHub::instance().client_count().await,
    })
}

/// Creates the status router.
pub fn status_router() -> Router<WebSocketState> {
    Router::new()
        .route("/api/hello", get(hello))
        .route("/api/rooms", get(list_rooms))
}
