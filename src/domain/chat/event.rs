//! Chat events carried by the hubs.
//!
//! [`Event`] is a closed tagged union: every hub, client loop and codec
//! matches on it exhaustively instead of testing runtime types.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// A chat message posted to a room.
///
/// Every field is optional on the wire; missing strings decode as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatMessage {
    pub message_id: String,
    pub room_id: String,
    #[serde(alias = "userId")]
    pub sender_id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl ChatMessage {
    /// Creates a message stamped with the current time.
    pub fn new(
        message_id: impl Into<String>,
        room_id: impl Into<String>,
        sender_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            room_id: room_id.into(),
            sender_id: sender_id.into(),
            content: content.into(),
            created_at: Some(Timestamp::now()),
        }
    }
}

/// A user joined or left a room.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoomMembershipChanged {
    pub room_id: String,
    pub user_id: String,
}

/// What happened to a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomLifecycleKind {
    RoomCreated,
    RoomDeleted,
}

/// A room was created or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomLifecycleChanged {
    #[serde(default)]
    pub room_id: String,
    #[serde(alias = "eventType")]
    pub kind: RoomLifecycleKind,
}

/// Wire tag of each event variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    MessageSent,
    RoomUserChange,
    RoomLifecycleChanged,
}

impl EventType {
    /// Canonical tag written on encode.
    pub const fn as_str(&self) -> &'static str {
        match self {
            EventType::MessageSent => "MessageSent",
            EventType::RoomUserChange => "RoomUserChange",
            EventType::RoomLifecycleChanged => "RoomLifecycleChanged",
        }
    }

    /// Resolves a wire tag, including the legacy spellings older clients send.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "MessageSent" | "message" => Some(EventType::MessageSent),
            "RoomUserChange" | "UserJoined" => Some(EventType::RoomUserChange),
            "RoomLifecycleChanged" | "roomEvent" => Some(EventType::RoomLifecycleChanged),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which kind of hub delivers an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventScope {
    /// Delivered to the clients of a single room.
    Room,
    /// Delivered to every client attached to the global hub.
    Global,
}

/// An event fanned out by a hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ChatMessage(ChatMessage),
    RoomMembershipChanged(RoomMembershipChanged),
    RoomLifecycleChanged(RoomLifecycleChanged),
}

impl Event {
    pub fn event_type(&self) -> EventType {
        match self {
            Event::ChatMessage(_) => EventType::MessageSent,
            Event::RoomMembershipChanged(_) => EventType::RoomUserChange,
            Event::RoomLifecycleChanged(_) => EventType::RoomLifecycleChanged,
        }
    }

    pub fn scope(&self) -> EventScope {
        match self {
            Event::ChatMessage(_) => EventScope::Room,
            Event::RoomMembershipChanged(_) | Event::RoomLifecycleChanged(_) => EventScope::Global,
        }
    }

    /// Room the event refers to (may be empty when the sender omitted it).
    pub fn room_id(&self) -> &str {
        match self {
            Event::ChatMessage(m) => &m.room_id,
            Event::RoomMembershipChanged(m) => &m.room_id,
            Event::RoomLifecycleChanged(l) => &l.room_id,
        }
    }
}

impl From<ChatMessage> for Event {
    fn from(message: ChatMessage) -> Self {
        Event::ChatMessage(message)
    }
}

impl From<RoomMembershipChanged> for Event {
    fn from(change: RoomMembershipChanged) -> Self {
        Event::RoomMembershipChanged(change)
    }
}

impl From<RoomLifecycleChanged> for Event {
    fn from(change: RoomLifecycleChanged) -> Self {
        Event::RoomLifecycleChanged(change)
    }
}
