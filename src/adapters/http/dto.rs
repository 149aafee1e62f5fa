//! Response types for the HTTP endpoints.

use serde::Serialize;

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
        }
    }
}

/// Response for `GET /api/hello`.
#[derive(Debug, Clone, Serialize)]
pub struct HelloResponse {
    pub message: String,
}

/// One live room in the rooms listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub room_id: String,
    pub clients: usize,
}

/// Response for `GET /api/rooms`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomsResponse {
    pub rooms: Vec<RoomSummary>,
    pub global_clients: usize,
}
