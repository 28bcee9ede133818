//! Inbound command handling and outbound fan-out.
//!
//! This module contains the Handler trait, the command registry that routes
//! decoded envelopes, and the broadcaster every handler delivers through.

mod core;
mod fanout;
mod messaging;
mod nickname;

pub use self::core::{Context, Handler, Registry};
pub use fanout::{Delivery, broadcast};
