//! Connected client - pumps frames between one WebSocket and one hub.
//!
//! A client runs two tasks:
//! - **inbound** reads frames, decodes them into events and broadcasts
//!   them through the hub, one frame at a time
//! - **outbound** drains the client's queue, encodes each event and writes
//!   it; when the hub closes the queue it sends a close frame and exits
//!
//! Whichever task finishes first ends the connection: the client is
//! unregistered from its hub and the other task is wound down.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Message;
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::domain::chat::{decode_frame, decode_frame_bytes, encode_frame, Event, ProtocolError};
use crate::domain::foundation::ClientId;
use crate::ports::{ClientHandle, Hub};

/// How long the outbound loop gets to flush its close frame once the
/// inbound side has gone away.
const CLOSE_FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

/// A connection bound to a single hub.
///
/// Creating a client registers nothing. The caller registers
/// [`Client::handle`] with the hub and then calls [`Client::serve`].
pub struct Client {
    id: ClientId,
    hub: Arc<dyn Hub>,
    sender: mpsc::Sender<Arc<Event>>,
    receiver: mpsc::Receiver<Arc<Event>>,
}

impl Client {
    /// Create a client with an outbound queue of `queue_capacity` events.
    pub fn new(hub: Arc<dyn Hub>, queue_capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(queue_capacity.max(1));
        Self {
            id: ClientId::new(),
            hub,
            sender,
            receiver,
        }
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    /// The handle to register with the hub.
    pub fn handle(&self) -> ClientHandle {
        ClientHandle::new(self.id, self.sender.clone())
    }

    /// Run both loops until the connection ends.
    ///
    /// `writer` and `reader` are the two halves of the connection, usually
    /// from `WebSocket::split`.
    pub async fn serve<W, R, E>(self, writer: W, reader: R)
    where
        W: Sink<Message> + Unpin + Send + 'static,
        W::Error: Display + Send,
        R: Stream<Item = Result<Message, E>> + Unpin + Send + 'static,
        E: Display + Send + 'static,
    {
        let Client {
            id,
            hub,
            sender,
            receiver,
        } = self;
        // The hub holds the only remaining sender, so unregistering closes
        // the queue and ends the outbound loop.
        drop(sender);

        let mut outbound = tokio::spawn(write_loop(receiver, writer, id));
        let mut inbound = tokio::spawn(read_loop(reader, Arc::clone(&hub), id));

        tokio::select! {
            _ = &mut inbound => {
                hub.unregister(id).await;
                match timeout(CLOSE_FLUSH_TIMEOUT, &mut outbound).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        tracing::debug!(client_id = %id, error = %e, "Outbound task failed");
                    }
                    Err(_) => {
                        tracing::debug!(client_id = %id, "Close frame not flushed in time, dropping connection");
                        outbound.abort();
                        // Dropping the writer closes the socket.
                        let _ = outbound.await;
                    }
                }
            }
            _ = &mut outbound => {
                inbound.abort();
                hub.unregister(id).await;
            }
        }

        tracing::info!(client_id = %id, hub = hub.name(), "Client disconnected");
    }
}

async fn read_loop<R, E>(mut reader: R, hub: Arc<dyn Hub>, client_id: ClientId)
where
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    while let Some(frame) = reader.next().await {
        let decoded = match frame {
            Ok(Message::Text(text)) => decode_frame(&text),
            Ok(Message::Binary(bytes)) => decode_frame_bytes(&bytes),
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                // Protocol pings are answered by the transport.
                continue;
            }
            Ok(Message::Close(_)) => {
                tracing::debug!(client_id = %client_id, "Client sent close frame");
                break;
            }
            Err(e) => {
                tracing::debug!(client_id = %client_id, error = %e, "Receive error");
                break;
            }
        };

        match decoded {
            Ok(event) => hub.broadcast(event).await,
            Err(e) => log_protocol_error(client_id, &e),
        }
    }
}

async fn write_loop<W>(mut receiver: mpsc::Receiver<Arc<Event>>, mut writer: W, client_id: ClientId)
where
    W: Sink<Message> + Unpin,
    W::Error: Display,
{
    while let Some(event) = receiver.recv().await {
        let frame = match encode_frame(&event) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(client_id = %client_id, error = %e, "Failed to encode event");
                continue;
            }
        };

        if let Err(e) = writer.send(Message::Text(frame)).await {
            tracing::debug!(client_id = %client_id, error = %e, "Send error, closing connection");
            return;
        }
    }

    // Queue closed: unregistered or evicted.
    if let Err(e) = writer.send(Message::Close(None)).await {
        tracing::debug!(client_id = %client_id, error = %e, "Failed to send close frame");
    }
    if let Err(e) = writer.close().await {
        tracing::debug!(client_id = %client_id, error = %e, "Failed to close connection");
    }
}

fn log_protocol_error(client_id: ClientId, error: &ProtocolError) {
    match error {
        ProtocolError::UnknownEventType(tag) => {
            tracing::warn!(client_id = %client_id, event_type = %tag, "Unknown event type, frame dropped");
        }
        other => {
            tracing::warn!(client_id = %client_id, error = %other, "Unreadable frame dropped");
        }
    }
}
