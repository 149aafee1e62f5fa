//! Chat events and their wire envelope.

mod envelope;
mod event;

pub use envelope::{decode_frame, decode_frame_bytes, encode_frame, Envelope, ProtocolError};
pub use event::{
    ChatMessage, Event, EventScope, EventType, RoomLifecycleChanged, RoomLifecycleKind,
    RoomMembershipChanged,
};
