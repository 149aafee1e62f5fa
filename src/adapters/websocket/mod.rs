//! WebSocket adapters for real-time chat fan-out.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  frames   ┌──────────────────┐  Broadcast  ┌──────────────┐
//! │  WebSocket   │ ────────▶ │ Client (inbound) │ ──────────▶ │     Hub      │
//! │  connection  │           └──────────────────┘             │  dispatcher  │
//! │              │  frames   ┌──────────────────┐  try_send   │              │
//! │              │ ◀──────── │ Client (outbound)│ ◀────────── │              │
//! └──────────────┘           └──────────────────┘             └──────────────┘
//! ```
//!
//! # Components
//!
//! - [`client`] - Per-connection read and write loops
//! - [`handler`] - Axum WebSocket upgrade handlers and router

pub mod client;
pub mod handler;

pub use client::Client;
pub use handler::{
    global_ws_handler, missing_room_handler, room_ws_handler, websocket_router, WebSocketState,
};
