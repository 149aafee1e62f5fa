//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps and validation errors that form
//! the vocabulary of the chat hub.

mod errors;
mod ids;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{ClientId, RoomId, MAX_ROOM_ID_LEN};
pub use timestamp::Timestamp;
