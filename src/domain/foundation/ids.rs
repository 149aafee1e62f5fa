//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Longest room identifier accepted from a connection path.
pub const MAX_ROOM_ID_LEN: usize = 128;

/// Identifier of a chat room.
///
/// Room ids arrive as URL path segments, so they are restricted to
/// ASCII alphanumerics, `-` and `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId(String);

impl RoomId {
    /// Creates a new RoomId, returning error if empty or malformed.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::empty_field("room_id"));
        }
        if id.len() > MAX_ROOM_ID_LEN {
            return Err(ValidationError::invalid_format(
                "room_id",
                format!("longer than {} characters", MAX_ROOM_ID_LEN),
            ));
        }
        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ValidationError::invalid_format(
                "room_id",
                "only letters, digits, '-' and '_' are allowed",
            ));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RoomId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoomId> for String {
    fn from(id: RoomId) -> Self {
        id.0
    }
}

/// Unique identifier for one live connection.
///
/// Generated server-side when a client connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(Uuid);

impl ClientId {
    /// Creates a new random ClientId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ClientId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_id_accepts_alphanumerics_dash_and_underscore() {
        let id = RoomId::new("general-chat_01").unwrap();
        assert_eq!(id.as_str(), "general-chat_01");
    }

    #[test]
    fn room_id_rejects_empty() {
        assert!(matches!(
            RoomId::new(""),
            Err(ValidationError::EmptyField { .. })
        ));
    }

    #[test]
    fn room_id_rejects_path_characters() {
        assert!(RoomId::new("a/b").is_err());
        assert!(RoomId::new("room id").is_err());
        assert!(RoomId::new("röom").is_err());
    }

    #[test]
    fn room_id_rejects_overlong() {
        let id = "r".repeat(MAX_ROOM_ID_LEN + 1);
        assert!(matches!(
            RoomId::new(id),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn room_id_deserialization_validates() {
        let ok: RoomId = serde_json::from_str("\"r1\"").unwrap();
        assert_eq!(ok.as_str(), "r1");
        assert!(serde_json::from_str::<RoomId>("\"no spaces\"").is_err());
    }

    #[test]
    fn client_ids_are_unique() {
        assert_ne!(ClientId::new(), ClientId::new());
    }

    #[test]
    fn client_id_display_is_uuid() {
        let id = ClientId::new();
        let display = id.to_string();
        assert_eq!(display.len(), 36);
        assert_eq!(display.parse::<ClientId>().unwrap(), id);
    }
}
