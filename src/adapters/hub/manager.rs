//! Hub manager - one room hub per room id.
//!
//! Room hubs are created lazily when the first client joins a room and
//! removed again by [`HubManager::reap_idle`] once they have sat empty and
//! unreferenced for longer than the configured grace period.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use super::room::RoomHub;
use crate::config::HubConfig;
use crate::domain::foundation::RoomId;
use crate::ports::Hub;

/// Registry of live room hubs.
#[derive(Debug)]
pub struct HubManager {
    hubs: RwLock<HashMap<RoomId, Arc<RoomHub>>>,
    config: HubConfig,
}

impl HubManager {
    pub fn new(config: HubConfig) -> Self {
        Self {
            hubs: RwLock::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Looks up a room hub without creating one.
    pub async fn get(&self, room_id: &RoomId) -> Option<Arc<RoomHub>> {
        self.hubs.read().await.get(room_id).cloned()
    }

    /// Creates and starts a hub for `room_id`.
    ///
    /// If a hub for the room is already live, it is returned instead so
    /// there is never more than one hub per room.
    pub async fn create(&self, room_id: RoomId) -> Arc<RoomHub> {
        let mut hubs = self.hubs.write().await;
        if let Some(existing) = hubs.get(&room_id) {
            tracing::warn!(room_id = %room_id, "Room hub already exists, returning existing hub");
            return Arc::clone(existing);
        }
        self.insert_new(&mut hubs, room_id)
    }

    /// Returns the room's hub, creating it on first use.
    pub async fn get_or_create(&self, room_id: RoomId) -> Arc<RoomHub> {
        if let Some(hub) = self.get(&room_id).await {
            return hub;
        }

        let mut hubs = self.hubs.write().await;
        // Another task may have created it between the two locks.
        if let Some(existing) = hubs.get(&room_id) {
            return Arc::clone(existing);
        }
        self.insert_new(&mut hubs, room_id)
    }

    fn insert_new(
        &self,
        hubs: &mut HashMap<RoomId, Arc<RoomHub>>,
        room_id: RoomId,
    ) -> Arc<RoomHub> {
        let hub = RoomHub::spawn(room_id.clone(), &self.config);
        hubs.insert(room_id, Arc::clone(&hub));
        tracing::debug!(total_rooms = hubs.len(), "Room hub registered");
        hub
    }

    /// Ids of all live room hubs, sorted.
    pub async fn active_rooms(&self) -> Vec<RoomId> {
        let mut rooms: Vec<RoomId> = self.hubs.read().await.keys().cloned().collect();
        rooms.sort();
        rooms
    }

    pub async fn room_count(&self) -> usize {
        self.hubs.read().await.len()
    }

    /// Client count per live room, sorted by room id.
    pub async fn room_stats(&self) -> Vec<(RoomId, usize)> {
        let hubs: Vec<Arc<RoomHub>> = self.hubs.read().await.values().cloned().collect();

        let mut stats = Vec::with_capacity(hubs.len());
        for hub in hubs {
            let clients = hub.client_count().await;
            stats.push((hub.room_id().clone(), clients));
        }
        stats.sort_by(|a, b| a.0.cmp(&b.0));
        stats
    }

    /// Total clients across every room hub.
    pub async fn total_clients(&self) -> usize {
        self.room_stats().await.iter().map(|(_, clients)| clients).sum()
    }

    /// Removes room hubs idle for longer than the configured grace period.
    pub async fn reap_idle(&self) -> usize {
        self.reap_idle_older_than(self.config.idle_room_grace()).await
    }

    /// Removes room hubs that nobody outside the manager holds, that have
    /// no clients, and that have been empty for at least `grace`.
    ///
    /// Dropping the manager's handle closes the hub's command queue, which
    /// stops its dispatch loop. Returns the number of hubs removed.
    pub async fn reap_idle_older_than(&self, grace: Duration) -> usize {
        let mut hubs = self.hubs.write().await;

        let mut idle = Vec::new();
        for (room_id, hub) in hubs.iter() {
            // Connected clients and in-flight handlers hold their own Arc.
            if Arc::strong_count(hub) > 1 {
                continue;
            }
            let reapable = match hub.stats().await {
                Some(stats) => {
                    stats.clients == 0
                        && stats
                            .empty_since
                            .is_some_and(|since| since.elapsed() >= grace)
                }
                None => true,
            };
            if reapable {
                idle.push(room_id.clone());
            }
        }

        for room_id in &idle {
            hubs.remove(room_id);
            tracing::info!(room_id = %room_id, "Reaped idle room hub");
        }
        idle.len()
    }
}
