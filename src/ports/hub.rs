//! Hub port - Interface every fan-out hub exposes to connected clients.
//!
//! A hub owns a registry of client outbound queues and delivers each
//! broadcast event to every registered client. Room hubs and the global
//! hub both implement this trait, so a connected client only ever sees
//! `Arc<dyn Hub>` and does not care which kind it talks to.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::domain::chat::Event;
use crate::domain::foundation::ClientId;

/// The hub-facing half of a connected client.
///
/// Holds the client's identity and the sending side of its bounded
/// outbound queue. Once a hub drops every `ClientHandle` for a client,
/// that client's outbound queue is closed and its write loop ends.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    id: ClientId,
    sender: mpsc::Sender<Arc<Event>>,
}

impl ClientHandle {
    pub fn new(id: ClientId, sender: mpsc::Sender<Arc<Event>>) -> Self {
        Self { id, sender }
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Attempts to enqueue an event without waiting.
    ///
    /// Fails with `Full` when the client is not keeping up and with
    /// `Closed` when the client has already gone away.
    pub fn try_deliver(&self, event: Arc<Event>) -> Result<(), TrySendError<Arc<Event>>> {
        self.sender.try_send(event)
    }
}

/// Point-in-time view of a hub's registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubStats {
    /// Number of registered clients.
    pub clients: usize,
    /// When the registry last became empty, `None` while clients are present.
    pub empty_since: Option<Instant>,
}

/// Port for a fan-out hub.
///
/// All operations are safe to call concurrently from any task. They are
/// fire-and-forget: once the hub's dispatch loop has stopped, commands are
/// dropped silently.
///
/// # Example
///
/// ```ignore
/// let hub: Arc<dyn Hub> = manager.get_or_create(room_id).await;
/// hub.register(client.handle()).await;
/// hub.broadcast(Event::ChatMessage(message)).await;
/// ```
#[async_trait]
pub trait Hub: Send + Sync {
    /// Human-readable hub name for logging, e.g. `room:lobby` or `global`.
    fn name(&self) -> &str;

    /// Adds a client to the registry.
    async fn register(&self, client: ClientHandle);

    /// Removes a client if present, closing its outbound queue.
    ///
    /// Unregistering an unknown or already-removed client is a no-op.
    async fn unregister(&self, client_id: ClientId);

    /// Delivers an event to every client registered at the time the
    /// dispatch loop processes it.
    async fn broadcast(&self, event: Event);

    /// Snapshot of the registry, `None` if the dispatch loop has stopped.
    async fn stats(&self) -> Option<HubStats>;

    /// Number of registered clients.
    async fn client_count(&self) -> usize {
        self.stats().await.map(|stats| stats.clients).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chat::ChatMessage;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn Hub) {}

    fn sample_event() -> Arc<Event> {
        Arc::new(Event::ChatMessage(ChatMessage::default()))
    }

    #[test]
    fn try_deliver_reports_full_queue() {
        let (tx, _rx) = mpsc::channel(1);
        let handle = ClientHandle::new(ClientId::new(), tx);

        assert!(handle.try_deliver(sample_event()).is_ok());
        assert!(matches!(
            handle.try_deliver(sample_event()),
            Err(TrySendError::Full(_))
        ));
    }

    #[test]
    fn try_deliver_reports_closed_queue() {
        let (tx, rx) = mpsc::channel(4);
        let handle = ClientHandle::new(ClientId::new(), tx);
        drop(rx);

        assert!(matches!(
            handle.try_deliver(sample_event()),
            Err(TrySendError::Closed(_))
        ));
    }

    #[test]
    fn cloned_handles_share_identity() {
        let (tx, _rx) = mpsc::channel(1);
        let handle = ClientHandle::new(ClientId::new(), tx);
        assert_eq!(handle.clone().id(), handle.id());
    }
}
