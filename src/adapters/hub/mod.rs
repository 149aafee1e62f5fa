//! Hub adapters - In-process fan-out hubs.
//!
//! - `RoomHub` - one per chat room, created on first join
//! - `GlobalHub` - process-wide singleton for membership and lifecycle events
//! - `HubManager` - room id to hub lookup with idle reaping
//! - `RoomReaper` - background task that drives the reaping

mod dispatcher;
mod global;
mod manager;
mod reaper;
mod room;

pub use global::GlobalHub;
pub use manager::HubManager;
pub use reaper::RoomReaper;
pub use room::RoomHub;
