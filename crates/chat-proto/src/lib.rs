//! # chat-proto
//!
//! Wire payloads for the chatd broadcast chat protocol.
//!
//! Every frame on the wire is a single JSON object discriminated by its
//! `type` field. Clients send [`Envelope`]s carrying a command name and an
//! optional `message` argument; the server answers with [`ServerMessage`]s.
//!
//! ```rust
//! use chat_proto::{Envelope, ServerMessage};
//!
//! let inbound = Envelope::from_text(r#"{"type":"sendChatMessage","message":"hi"}"#).unwrap();
//! assert_eq!(inbound.command(), "sendChatMessage");
//! assert_eq!(inbound.text(), Some("hi"));
//!
//! let outbound = ServerMessage::chat("Alice", "hi").to_json().unwrap();
//! assert_eq!(outbound, r#"{"type":"message","nickname":"Alice","message":"hi"}"#);
//! ```
//!
//! Liveness probing is not part of this crate: it rides on the transport's
//! own ping/pong frames.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod command;
mod envelope;
mod error;
mod message;

pub use envelope::Envelope;
pub use error::DecodeError;
pub use message::{ServerMessage, SYSTEM_NICKNAME};
