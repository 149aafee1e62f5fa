//! Wire envelope for events.
//!
//! Every frame in either direction is a JSON object
//! `{"type": "<tag>", "data": <payload>}`. Decoding dispatches on `type`
//! alone; the payload is only parsed once the variant is known.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::event::{Event, EventType};

/// Errors raised while decoding or encoding frames.
///
/// None of these are fatal to a connection: the offending frame is
/// logged and dropped.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed frame: {0}")]
    MalformedFrame(#[source] serde_json::Error),

    #[error("Unrecognized event type: {0}")]
    UnknownEventType(String),

    #[error("Invalid payload for event type '{event_type}': {source}")]
    InvalidPayload {
        event_type: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode event: {0}")]
    Encode(#[source] serde_json::Error),
}

/// The `{type, data}` wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Envelope {
    /// Wraps an event under its canonical tag.
    pub fn from_event(event: &Event) -> Result<Self, ProtocolError> {
        let data = match event {
            Event::ChatMessage(message) => serde_json::to_value(message),
            Event::RoomMembershipChanged(change) => serde_json::to_value(change),
            Event::RoomLifecycleChanged(change) => serde_json::to_value(change),
        }
        .map_err(ProtocolError::Encode)?;

        Ok(Self {
            event_type: event.event_type().as_str().to_string(),
            data,
        })
    }

    /// Resolves the tag and parses the payload into the matching variant.
    pub fn into_event(self) -> Result<Event, ProtocolError> {
        let Envelope {
            event_type: tag,
            data,
        } = self;

        let event_type = EventType::from_tag(&tag)
            .ok_or_else(|| ProtocolError::UnknownEventType(tag.clone()))?;

        let parsed = match event_type {
            EventType::MessageSent => serde_json::from_value(data).map(Event::ChatMessage),
            EventType::RoomUserChange => {
                serde_json::from_value(data).map(Event::RoomMembershipChanged)
            }
            EventType::RoomLifecycleChanged => {
                serde_json::from_value(data).map(Event::RoomLifecycleChanged)
            }
        };

        parsed.map_err(|source| ProtocolError::InvalidPayload {
            event_type: tag,
            source,
        })
    }
}

/// Decodes a text frame into an event.
pub fn decode_frame(text: &str) -> Result<Event, ProtocolError> {
    let envelope: Envelope = serde_json::from_str(text).map_err(ProtocolError::MalformedFrame)?;
    envelope.into_event()
}

/// Decodes a binary frame carrying UTF-8 JSON into an event.
pub fn decode_frame_bytes(bytes: &[u8]) -> Result<Event, ProtocolError> {
    let envelope: Envelope =
        serde_json::from_slice(bytes).map_err(ProtocolError::MalformedFrame)?;
    envelope.into_event()
}

/// Encodes an event into a text frame.
pub fn encode_frame(event: &Event) -> Result<String, ProtocolError> {
    let envelope = Envelope::from_event(event)?;
    serde_json::to_string(&envelope).map_err(ProtocolError::Encode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chat::{ChatMessage, RoomLifecycleKind, RoomMembershipChanged};
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn decodes_message_sent_with_partial_payload() {
        let event = decode_frame(r#"{"type":"MessageSent","data":{"content":"hi"}}"#).unwrap();

        match event {
            Event::ChatMessage(message) => {
                assert_eq!(message.content, "hi");
                assert_eq!(message.room_id, "");
                assert!(message.created_at.is_none());
            }
            other => panic!("expected chat message, got {:?}", other),
        }
    }

    #[test]
    fn decodes_user_joined_as_membership_change() {
        let event =
            decode_frame(r#"{"type":"UserJoined","data":{"roomId":"r1","userId":"u1"}}"#).unwrap();

        assert_eq!(
            event,
            Event::RoomMembershipChanged(RoomMembershipChanged {
                room_id: "r1".to_string(),
                user_id: "u1".to_string(),
            })
        );
    }

    #[test]
    fn decodes_legacy_room_event() {
        let event = decode_frame(
            r#"{"type":"roomEvent","data":{"roomId":"r1","eventType":"ROOM_CREATED"}}"#,
        )
        .unwrap();

        match event {
            Event::RoomLifecycleChanged(change) => {
                assert_eq!(change.kind, RoomLifecycleKind::RoomCreated)
            }
            other => panic!("expected lifecycle change, got {:?}", other),
        }
    }

    #[test]
    fn unknown_type_is_reported() {
        let err = decode_frame(r#"{"type":"Bogus","data":{}}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownEventType(ref t) if t == "Bogus"));
    }

    #[test]
    fn payload_mismatch_is_reported() {
        let err = decode_frame(r#"{"type":"MessageSent","data":{"content":42}}"#).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::InvalidPayload { ref event_type, .. } if event_type == "MessageSent"
        ));
    }

    #[test]
    fn missing_data_is_an_invalid_payload() {
        let err = decode_frame(r#"{"type":"MessageSent"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidPayload { .. }));
    }

    #[test]
    fn non_envelope_is_malformed() {
        assert!(matches!(
            decode_frame("not json"),
            Err(ProtocolError::MalformedFrame(_))
        ));
        assert!(matches!(
            decode_frame(r#"{"data":{}}"#),
            Err(ProtocolError::MalformedFrame(_))
        ));
    }

    #[test]
    fn binary_frames_decode_like_text() {
        let event = decode_frame_bytes(br#"{"type":"MessageSent","data":{"content":"b"}}"#).unwrap();
        assert_eq!(event.event_type(), EventType::MessageSent);
    }

    #[test]
    fn encode_uses_canonical_tag() {
        let mut message = ChatMessage::new("m1", "r1", "u1", "hi");
        message.created_at = None;

        let frame = encode_frame(&Event::ChatMessage(message)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();

        assert_eq!(
            value,
            json!({
                "type": "MessageSent",
                "data": {"messageId": "m1", "roomId": "r1", "senderId": "u1", "content": "hi"}
            })
        );
    }

    #[test]
    fn legacy_tag_is_rewritten_on_encode() {
        let event = decode_frame(r#"{"type":"UserJoined","data":{"roomId":"r1","userId":"u1"}}"#)
            .unwrap();
        let envelope = Envelope::from_event(&event).unwrap();
        assert_eq!(envelope.event_type, "RoomUserChange");
    }

    proptest! {
        #[test]
        fn unknown_tags_are_always_rejected(tag in "[A-Za-z]{1,16}") {
            prop_assume!(EventType::from_tag(&tag).is_none());
            let frame = json!({"type": tag, "data": {}}).to_string();
            prop_assert!(matches!(decode_frame(&frame), Err(ProtocolError::UnknownEventType(_))));
        }

        #[test]
        fn arbitrary_text_never_panics(text in ".*") {
            let _ = decode_frame(&text);
        }

        #[test]
        fn chat_content_survives_encoding(content in ".*") {
            let event = Event::ChatMessage(ChatMessage {
                content: content.clone(),
                ..ChatMessage::default()
            });
            let decoded = decode_frame(&encode_frame(&event).unwrap()).unwrap();
            prop_assert_eq!(decoded, event);
        }
    }
}
