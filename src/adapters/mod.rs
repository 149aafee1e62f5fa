//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `hub` - In-process fan-out hubs and their manager
//! - `websocket` - Client connections and upgrade handlers
//! - `http` - Router assembly and status endpoints

pub mod http;
pub mod hub;
pub mod websocket;

pub use http::build_router;
pub use hub::{GlobalHub, HubManager, RoomHub, RoomReaper};
pub use websocket::{Client, WebSocketState};
