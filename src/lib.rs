//! Chat Hub - Real-time WebSocket fan-out for chat rooms
//!
//! Clients connect to a room (`/ws/rooms/:room_id`) or to the process-wide
//! feed (`/ws/global`). Every event a client sends is broadcast to every
//! client connected to the same hub.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
