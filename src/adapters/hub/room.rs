//! Room hub - fan-out for the clients of a single chat room.

use std::sync::Arc;

use async_trait::async_trait;

use super::dispatcher::{Dispatcher, HubMailbox};
use crate::config::HubConfig;
use crate::domain::chat::{Event, EventScope};
use crate::domain::foundation::{ClientId, RoomId};
use crate::ports::{ClientHandle, Hub, HubStats};

/// Hub carrying room-scoped events for one room.
///
/// Chat messages broadcast without a room id are stamped with this hub's
/// room; messages addressed to a different room are dropped.
#[derive(Debug)]
pub struct RoomHub {
    room_id: RoomId,
    mailbox: HubMailbox,
}

impl RoomHub {
    /// Creates the hub and starts its dispatch loop.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(room_id: RoomId, config: &HubConfig) -> Arc<Self> {
        let (mailbox, dispatcher) = Dispatcher::new(
            format!("room:{}", room_id),
            EventScope::Room,
            config.command_capacity,
        );
        tokio::spawn(dispatcher.run());

        tracing::info!(room_id = %room_id, "Room hub started");

        Arc::new(Self { room_id, mailbox })
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }
}

#[async_trait]
impl Hub for RoomHub {
    fn name(&self) -> &str {
        self.mailbox.name()
    }

    async fn register(&self, client: ClientHandle) {
        self.mailbox.register(client).await;
    }

    async fn unregister(&self, client_id: ClientId) {
        self.mailbox.unregister(client_id).await;
    }

    async fn broadcast(&self, mut event: Event) {
        if let Event::ChatMessage(message) = &mut event {
            if message.room_id.is_empty() {
                message.room_id = self.room_id.to_string();
            } else if message.room_id != self.room_id.as_str() {
                tracing::warn!(
                    room_id = %self.room_id,
                    target_room = %message.room_id,
                    "Message addressed to another room, dropping"
                );
                return;
            }
        }
        self.mailbox.broadcast(event).await;
    }

    async fn stats(&self) -> Option<HubStats> {
        self.mailbox.stats().await
    }
}
