//! Global hub - process-wide fan-out for clients on `/ws/global`.
//!
//! There is exactly one global hub per process. It is created lazily by
//! the first call to [`GlobalHub::instance`] (or
//! [`GlobalHub::instance_with`]), which also starts its dispatch loop.
//! Concurrent first calls all observe the same instance.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::OnceCell;

use super::dispatcher::{Dispatcher, HubMailbox};
use crate::config::HubConfig;
use crate::domain::chat::{Event, EventScope};
use crate::domain::foundation::ClientId;
use crate::ports::{ClientHandle, Hub, HubStats};

static GLOBAL_HUB: OnceCell<Arc<GlobalHub>> = OnceCell::new();
static DISPATCH_LOOPS_STARTED: AtomicUsize = AtomicUsize::new(0);

/// Hub carrying process-scoped events (membership and room lifecycle).
#[derive(Debug)]
pub struct GlobalHub {
    mailbox: HubMailbox,
}

impl GlobalHub {
    /// Returns the process-wide hub, starting it with default settings on
    /// first use.
    ///
    /// # Panics
    ///
    /// The first call must happen inside a Tokio runtime, since it spawns
    /// the dispatch loop.
    pub fn instance() -> Arc<GlobalHub> {
        Self::instance_with(&HubConfig::default())
    }

    /// Returns the process-wide hub, starting it with `config` on first
    /// use. Later calls ignore `config`.
    pub fn instance_with(config: &HubConfig) -> Arc<GlobalHub> {
        Arc::clone(GLOBAL_HUB.get_or_init(|| {
            DISPATCH_LOOPS_STARTED.fetch_add(1, Ordering::SeqCst);
            tracing::info!("Global hub started");
            Self::start(config)
        }))
    }

    /// Number of global dispatch loops started in this process.
    pub fn dispatch_loops_started() -> usize {
        DISPATCH_LOOPS_STARTED.load(Ordering::SeqCst)
    }

    fn start(config: &HubConfig) -> Arc<Self> {
        let (mailbox, dispatcher) =
            Dispatcher::new("global", EventScope::Global, config.command_capacity);
        tokio::spawn(dispatcher.run());
        Arc::new(Self { mailbox })
    }

    /// A hub independent of the process-wide instance, so unit tests do
    /// not share one dispatch loop across test runtimes.
    #[cfg(test)]
    pub(crate) fn detached() -> Arc<Self> {
        Self::start(&HubConfig::default())
    }
}

#[async_trait]
impl Hub for GlobalHub {
    fn name(&self) -> &str {
        self.mailbox.name()
    }

    async fn register(&self, client: ClientHandle) {
        self.mailbox.register(client).await;
    }

    async fn unregister(&self, client_id: ClientId) {
        self.mailbox.unregister(client_id).await;
    }

    async fn broadcast(&self, event: Event) {
        self.mailbox.broadcast(event).await;
    }

    async fn stats(&self) -> Option<HubStats> {
        self.mailbox.stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chat::{ChatMessage, RoomMembershipChanged};
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    // The only test that touches the process-wide instance: its dispatch
    // loop lives on this test's runtime.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_access_yields_one_instance() {
        let handles: Vec<_> = (0..16)
            .map(|_| tokio::spawn(async { GlobalHub::instance() }))
            .collect();

        let mut hubs = Vec::new();
        for handle in handles {
            hubs.push(handle.await.unwrap());
        }

        let first = &hubs[0];
        assert!(hubs.iter().all(|hub| Arc::ptr_eq(hub, first)));
        assert!(Arc::ptr_eq(first, &GlobalHub::instance()));
        assert_eq!(GlobalHub::dispatch_loops_started(), 1);
        assert_eq!(first.name(), "global");
        assert_eq!(first.client_count().await, 0);
    }

    #[tokio::test]
    async fn delivers_membership_changes() {
        let hub = GlobalHub::detached();
        let (tx, mut rx) = mpsc::channel(8);
        hub.register(ClientHandle::new(ClientId::new(), tx)).await;

        hub.broadcast(Event::RoomMembershipChanged(RoomMembershipChanged {
            room_id: "r1".to_string(),
            user_id: "u1".to_string(),
        }))
        .await;

        let event = timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(event.as_ref(), Event::RoomMembershipChanged(_)));
    }

    #[tokio::test]
    async fn drops_room_scoped_messages() {
        let hub = GlobalHub::detached();
        let (tx, mut rx) = mpsc::channel(8);
        hub.register(ClientHandle::new(ClientId::new(), tx)).await;

        hub.broadcast(Event::ChatMessage(ChatMessage::default())).await;
        // Stats round-trips through the loop, so the broadcast was handled.
        assert_eq!(hub.client_count().await, 1);

        assert!(rx.try_recv().is_err());
    }
}
