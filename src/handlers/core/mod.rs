//! Core handler infrastructure.
//!
//! This module contains the handler trait, the context handed to each
//! handler, and the command registry that routes decoded envelopes.

pub mod context;
pub mod registry;

pub use context::{Context, Handler};
pub use registry::Registry;
