//! Domain layer containing the chat hub's vocabulary.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, validation errors)
//! - `chat` - Chat events and the `{type, data}` wire envelope

pub mod chat;
pub mod foundation;
