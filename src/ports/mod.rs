//! Ports - Interfaces between connected clients and the hubs they talk to.
//!
//! ## Hub Ports
//!
//! - `Hub` - Register, unregister and broadcast on a fan-out hub
//! - `ClientHandle` - The hub-facing half of a connected client
//! - `HubStats` - Registry snapshot used for monitoring and idle reaping

mod hub;

pub use hub::{ClientHandle, Hub, HubStats};
