//! Hub dispatch loop.
//!
//! Each hub owns exactly one [`Dispatcher`] running on its own task. The
//! dispatcher is the only code that touches the client registry: every
//! register, unregister, broadcast and stats request arrives as a
//! [`HubCommand`] on a bounded queue and is applied in arrival order.
//!
//! Fan-out never waits on a client. A client whose outbound queue is full
//! (or already closed) is evicted on the spot and the remaining clients
//! still receive the event.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};

use crate::domain::chat::{Event, EventScope};
use crate::domain::foundation::ClientId;
use crate::ports::{ClientHandle, HubStats};

/// Commands accepted by a hub's dispatch loop.
#[derive(Debug)]
pub(crate) enum HubCommand {
    Register(ClientHandle),
    Unregister(ClientId),
    Broadcast(Event),
    Stats(oneshot::Sender<HubStats>),
}

/// Sending side of a hub's command queue.
///
/// Dropping every mailbox for a hub closes the queue, which ends the
/// dispatch loop and closes every client queue it still holds.
#[derive(Debug, Clone)]
pub(crate) struct HubMailbox {
    name: Arc<str>,
    commands: mpsc::Sender<HubCommand>,
}

impl HubMailbox {
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) async fn register(&self, client: ClientHandle) {
        self.send(HubCommand::Register(client)).await;
    }

    pub(crate) async fn unregister(&self, client_id: ClientId) {
        self.send(HubCommand::Unregister(client_id)).await;
    }

    pub(crate) async fn broadcast(&self, event: Event) {
        self.send(HubCommand::Broadcast(event)).await;
    }

    pub(crate) async fn stats(&self) -> Option<HubStats> {
        let (reply, response) = oneshot::channel();
        if self.commands.send(HubCommand::Stats(reply)).await.is_err() {
            tracing::debug!(hub = %self.name, "Hub dispatch loop has stopped, no stats");
            return None;
        }
        response.await.ok()
    }

    async fn send(&self, command: HubCommand) {
        if self.commands.send(command).await.is_err() {
            tracing::debug!(hub = %self.name, "Hub dispatch loop has stopped, command dropped");
        }
    }
}

/// The registry owner for one hub.
pub(crate) struct Dispatcher {
    name: Arc<str>,
    scope: EventScope,
    commands: mpsc::Receiver<HubCommand>,
    clients: HashMap<ClientId, ClientHandle>,
    empty_since: Option<Instant>,
}

impl Dispatcher {
    /// Creates a dispatcher and the mailbox that feeds it.
    ///
    /// The dispatcher does nothing until [`Dispatcher::run`] is spawned.
    pub(crate) fn new(
        name: impl Into<Arc<str>>,
        scope: EventScope,
        command_capacity: usize,
    ) -> (HubMailbox, Self) {
        let name = name.into();
        let (tx, rx) = mpsc::channel(command_capacity.max(1));

        let mailbox = HubMailbox {
            name: Arc::clone(&name),
            commands: tx,
        };
        let dispatcher = Self {
            name,
            scope,
            commands: rx,
            clients: HashMap::new(),
            empty_since: Some(Instant::now()),
        };
        (mailbox, dispatcher)
    }

    /// Applies commands until every mailbox has been dropped.
    pub(crate) async fn run(mut self) {
        tracing::debug!(hub = %self.name, "Hub dispatch loop started");

        while let Some(command) = self.commands.recv().await {
            self.apply(command);
        }

        tracing::info!(
            hub = %self.name,
            remaining_clients = self.clients.len(),
            "Hub dispatch loop stopped"
        );
    }

    fn apply(&mut self, command: HubCommand) {
        match command {
            HubCommand::Register(client) => self.register(client),
            HubCommand::Unregister(client_id) => self.unregister(client_id),
            HubCommand::Broadcast(event) => self.dispatch(event),
            HubCommand::Stats(reply) => {
                // The requester may have given up waiting.
                let _ = reply.send(self.stats());
            }
        }
    }

    fn register(&mut self, client: ClientHandle) {
        let client_id = client.id();
        if self.clients.contains_key(&client_id) {
            tracing::debug!(hub = %self.name, client_id = %client_id, "Client already registered");
            return;
        }

        self.clients.insert(client_id, client);
        self.empty_since = None;

        tracing::debug!(
            hub = %self.name,
            client_id = %client_id,
            total_clients = self.clients.len(),
            "Client registered"
        );
    }

    fn unregister(&mut self, client_id: ClientId) {
        // Dropping the handle closes the client's outbound queue.
        if self.clients.remove(&client_id).is_none() {
            return;
        }
        self.mark_if_empty();

        tracing::debug!(
            hub = %self.name,
            client_id = %client_id,
            total_clients = self.clients.len(),
            "Client unregistered"
        );
    }

    fn dispatch(&mut self, event: Event) {
        let event_type = event.event_type();
        if event.scope() != self.scope {
            tracing::warn!(
                hub = %self.name,
                event_type = %event_type,
                "Event outside hub scope, dropping"
            );
            return;
        }

        let event = Arc::new(event);
        let mut evicted = Vec::new();

        for (client_id, client) in &self.clients {
            match client.try_deliver(Arc::clone(&event)) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(
                        hub = %self.name,
                        client_id = %client_id,
                        event_type = %event_type,
                        "Client outbound queue full, evicting slow consumer"
                    );
                    evicted.push(*client_id);
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(
                        hub = %self.name,
                        client_id = %client_id,
                        "Client outbound queue closed, removing"
                    );
                    evicted.push(*client_id);
                }
            }
        }

        for client_id in evicted {
            self.clients.remove(&client_id);
        }
        self.mark_if_empty();

        tracing::trace!(
            hub = %self.name,
            event_type = %event_type,
            total_clients = self.clients.len(),
            "Event dispatched"
        );
    }

    fn mark_if_empty(&mut self) {
        if self.clients.is_empty() && self.empty_since.is_none() {
            self.empty_since = Some(Instant::now());
        }
    }

    fn stats(&self) -> HubStats {
        HubStats {
            clients: self.clients.len(),
            empty_since: self.empty_since,
        }
    }
}
