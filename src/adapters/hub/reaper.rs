//! Room reaper - background service that removes idle room hubs.
//!
//! # Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `reap_interval` | 60s | How often to look for idle rooms |
//! | `idle_room_grace` | 300s | How long a room must sit empty before removal |
//!
//! # Graceful Shutdown
//!
//! The service listens for a shutdown signal on a `watch` channel and
//! exits after the current pass completes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use super::manager::HubManager;

/// Background service that periodically calls [`HubManager::reap_idle`].
pub struct RoomReaper {
    manager: Arc<HubManager>,
    interval: Duration,
}

impl RoomReaper {
    /// Create a reaper using the manager's configured interval.
    pub fn new(manager: Arc<HubManager>) -> Self {
        let interval = manager.config().reap_interval();
        Self { manager, interval }
    }

    /// Override how often the reaper runs.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run the reaper loop until shutdown signal is received.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.interval);
        // The first tick fires immediately; nothing can be idle yet.
        interval.tick().await;

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::debug!("Room reaper stopping");
                        return;
                    }
                }

                _ = interval.tick() => {
                    self.reap_once().await;
                }
            }
        }
    }

    /// Run a single reaping pass. Returns the number of rooms removed.
    pub async fn reap_once(&self) -> usize {
        let reaped = self.manager.reap_idle().await;
        if reaped > 0 {
            let remaining_rooms = self.manager.room_count().await;
            tracing::info!(reaped, remaining_rooms, "Idle room hubs reaped");
        }
        reaped
    }
}
